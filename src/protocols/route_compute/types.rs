use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::{LinkCost, RouterId, RoutingTable};

pub use crate::model::Graph;

/// Result of one single-source shortest path run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShortestPathTree<C> {
    pub source: RouterId,
    pub dist: BTreeMap<RouterId, C>,
    pub predecessor: BTreeMap<RouterId, RouterId>,
    pub first_hop: BTreeMap<RouterId, RouterId>,
}

impl<C: LinkCost> ShortestPathTree<C> {
    pub fn cost_to(&self, destination: &str) -> Option<C> {
        self.dist.get(destination).copied()
    }

    /// Source-to-destination router sequence rebuilt from predecessors.
    pub fn path_to(&self, destination: &str) -> Option<Vec<RouterId>> {
        let (mut current, _) = self.dist.get_key_value(destination)?;
        let mut path = vec![current.clone()];
        while *current != self.source {
            current = self.predecessor.get(current.as_str())?;
            path.push(current.clone());
        }
        path.reverse();
        Some(path)
    }
}

impl<C: LinkCost> From<&ShortestPathTree<C>> for RoutingTable<C> {
    fn from(tree: &ShortestPathTree<C>) -> Self {
        let mut table = RoutingTable::new(tree.source.clone());
        for (destination, cost) in &tree.dist {
            table.insert(
                destination.clone(),
                *cost,
                tree.first_hop.get(destination.as_str()).cloned(),
            );
        }
        table
    }
}
