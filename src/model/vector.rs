use std::collections::BTreeMap;

use serde::Serialize;

use super::cost::LinkCost;
use super::topology::RouterId;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorEntry<C> {
    pub cost: C,
    /// Neighbor the cost was learned through; `None` for the owner itself.
    pub next_hop: Option<RouterId>,
}

/// A router's believed distance to every destination it has heard of.
///
/// The owner's own entry is always present at cost zero and is never
/// displaced, whatever neighbors advertise.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistanceVector<C> {
    owner: RouterId,
    entries: BTreeMap<RouterId, VectorEntry<C>>,
}

impl<C: LinkCost> DistanceVector<C> {
    pub fn new(owner: RouterId) -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(
            owner.clone(),
            VectorEntry {
                cost: C::zero(),
                next_hop: None,
            },
        );
        Self { owner, entries }
    }

    /// Vector known before any exchange: self plus direct links.
    pub fn seeded(owner: RouterId, links: &BTreeMap<RouterId, C>) -> Self {
        let mut vector = Self::new(owner);
        for (neighbor, cost) in links {
            if *neighbor == vector.owner {
                continue;
            }
            vector.entries.insert(
                neighbor.clone(),
                VectorEntry {
                    cost: *cost,
                    next_hop: Some(neighbor.clone()),
                },
            );
        }
        vector
    }

    pub fn owner(&self) -> &RouterId {
        &self.owner
    }

    /// Records `cost` via `next_hop` if the destination is new or the cost
    /// strictly improves on the current best. Returns whether it changed.
    pub fn offer(&mut self, destination: &RouterId, cost: C, next_hop: &RouterId) -> bool {
        if *destination == self.owner {
            return false;
        }
        match self.entries.get_mut(destination) {
            Some(entry) if !cost.improves_on(&entry.cost) => false,
            Some(entry) => {
                entry.cost = cost;
                entry.next_hop = Some(next_hop.clone());
                true
            }
            None => {
                self.entries.insert(
                    destination.clone(),
                    VectorEntry {
                        cost,
                        next_hop: Some(next_hop.clone()),
                    },
                );
                true
            }
        }
    }

    pub fn cost_to(&self, destination: &str) -> Option<C> {
        self.entries.get(destination).map(|entry| entry.cost)
    }

    pub fn next_hop(&self, destination: &str) -> Option<&RouterId> {
        self.entries
            .get(destination)
            .and_then(|entry| entry.next_hop.as_ref())
    }

    pub fn costs(&self) -> BTreeMap<RouterId, C> {
        self.entries
            .iter()
            .map(|(destination, entry)| (destination.clone(), entry.cost))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RouterId, &VectorEntry<C>)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
