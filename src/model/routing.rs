use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::cost::LinkCost;
use super::topology::RouterId;
use super::vector::DistanceVector;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    DistanceVector,
    LinkState,
}

impl Algorithm {
    pub fn name(&self) -> &'static str {
        match self {
            Self::DistanceVector => "distance_vector",
            Self::LinkState => "link_state",
        }
    }

    /// Heading used when printing a router's result.
    pub fn result_label(&self) -> &'static str {
        match self {
            Self::DistanceVector => "Distance Vector",
            Self::LinkState => "Shortest Paths",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteEntry<C> {
    pub destination: RouterId,
    pub cost: C,
    pub next_hop: Option<RouterId>,
}

/// Final per-router output of either engine. Unreachable destinations are
/// absent; the router itself is present at cost zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutingTable<C> {
    pub router: RouterId,
    routes: BTreeMap<RouterId, RouteEntry<C>>,
}

impl<C: LinkCost> RoutingTable<C> {
    pub fn new(router: RouterId) -> Self {
        Self {
            router,
            routes: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, destination: RouterId, cost: C, next_hop: Option<RouterId>) {
        self.routes.insert(
            destination.clone(),
            RouteEntry {
                destination,
                cost,
                next_hop,
            },
        );
    }

    pub fn get(&self, destination: &str) -> Option<&RouteEntry<C>> {
        self.routes.get(destination)
    }

    pub fn cost_to(&self, destination: &str) -> Option<C> {
        self.get(destination).map(|route| route.cost)
    }

    pub fn next_hop(&self, destination: &str) -> Option<&RouterId> {
        self.get(destination)
            .and_then(|route| route.next_hop.as_ref())
    }

    pub fn costs(&self) -> BTreeMap<RouterId, C> {
        self.routes
            .iter()
            .map(|(destination, route)| (destination.clone(), route.cost))
            .collect()
    }

    pub fn routes(&self) -> impl Iterator<Item = &RouteEntry<C>> {
        self.routes.values()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl<C: LinkCost> From<&DistanceVector<C>> for RoutingTable<C> {
    fn from(vector: &DistanceVector<C>) -> Self {
        let mut table = Self::new(vector.owner().clone());
        for (destination, entry) in vector.iter() {
            table.insert(destination.clone(), entry.cost, entry.next_hop.clone());
        }
        table
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport<C> {
    pub algorithm: Algorithm,
    /// Vector exchange rounds (distance vector) or flooding rounds (link
    /// state) needed before the tables settled.
    pub rounds: usize,
    pub tables: BTreeMap<RouterId, RoutingTable<C>>,
}

impl<C: LinkCost> SimulationReport<C> {
    pub fn table(&self, router: &str) -> Option<&RoutingTable<C>> {
        self.tables.get(router)
    }

    pub fn distance(&self, from: &str, to: &str) -> Option<C> {
        self.table(from).and_then(|table| table.cost_to(to))
    }

    pub fn cost_matrix(&self) -> BTreeMap<RouterId, BTreeMap<RouterId, C>> {
        self.tables
            .iter()
            .map(|(router, table)| (router.clone(), table.costs()))
            .collect()
    }

    /// Follows next hops from table to table. Returns `None` when the
    /// destination is unreachable or the hops loop.
    pub fn path(&self, from: &str, to: &str) -> Option<Vec<RouterId>> {
        let mut current = self.tables.get_key_value(from)?.0.clone();
        let mut path = vec![current.clone()];
        while current.as_str() != to {
            if path.len() > self.tables.len() {
                return None;
            }
            let next = self.table(current.as_str())?.next_hop(to)?.clone();
            path.push(next.clone());
            current = next;
        }
        Some(path)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Disagreement<C> {
    pub router: RouterId,
    pub destination: RouterId,
    pub left: Option<C>,
    pub right: Option<C>,
}

/// Every (router, destination) whose cost differs between two reports.
pub fn compare_reports<C: LinkCost>(
    left: &SimulationReport<C>,
    right: &SimulationReport<C>,
) -> Vec<Disagreement<C>> {
    let left_costs = left.cost_matrix();
    let right_costs = right.cost_matrix();

    let mut pairs: BTreeMap<(RouterId, RouterId), (Option<C>, Option<C>)> = BTreeMap::new();
    for (router, row) in &left_costs {
        for (destination, cost) in row {
            pairs
                .entry((router.clone(), destination.clone()))
                .or_default()
                .0 = Some(*cost);
        }
    }
    for (router, row) in &right_costs {
        for (destination, cost) in row {
            pairs
                .entry((router.clone(), destination.clone()))
                .or_default()
                .1 = Some(*cost);
        }
    }

    pairs
        .into_iter()
        .filter(|(_, (a, b))| match (a, b) {
            (Some(a), Some(b)) => a.total_cmp(b).is_ne(),
            (None, None) => false,
            _ => true,
        })
        .map(|((router, destination), (left, right))| Disagreement {
            router,
            destination,
            left,
            right,
        })
        .collect()
}
