use std::borrow::Borrow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::cost::LinkCost;
use super::error::RoutingError;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouterId(String);

impl RouterId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RouterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for RouterId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RouterId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for RouterId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

pub type Graph<C> = BTreeMap<RouterId, BTreeMap<RouterId, C>>;

/// Static router graph shared by both engines.
///
/// Every neighbor named in a row must also be a top-level router. Costs are
/// not validated here: negative values are accepted, but Dijkstra requires
/// non-negative costs and the link-state engine rejects them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Topology<C> {
    graph: Graph<C>,
}

impl<C: LinkCost> Topology<C> {
    pub fn new(graph: Graph<C>) -> Result<Self, RoutingError<C>> {
        for (router, neighbors) in &graph {
            for neighbor in neighbors.keys() {
                if !graph.contains_key(neighbor) {
                    return Err(RoutingError::UnknownRouter {
                        router: neighbor.clone(),
                        referenced_by: Some(router.clone()),
                    });
                }
            }
        }
        Ok(Self { graph })
    }

    /// Builds a topology from `(router, [(neighbor, cost)])` rows.
    pub fn from_rows<I, R, N>(rows: I) -> Result<Self, RoutingError<C>>
    where
        I: IntoIterator<Item = (R, N)>,
        R: Into<RouterId>,
        N: IntoIterator<Item = (R, C)>,
    {
        let graph = rows
            .into_iter()
            .map(|(router, neighbors)| {
                let neighbors = neighbors
                    .into_iter()
                    .map(|(neighbor, cost)| (neighbor.into(), cost))
                    .collect();
                (router.into(), neighbors)
            })
            .collect();
        Self::new(graph)
    }

    pub fn graph(&self) -> &Graph<C> {
        &self.graph
    }

    pub fn neighbors(&self, router: &str) -> Result<&BTreeMap<RouterId, C>, RoutingError<C>> {
        self.graph
            .get(router)
            .ok_or_else(|| RoutingError::unknown(router))
    }

    pub fn all_routers(&self) -> BTreeSet<RouterId> {
        self.graph.keys().cloned().collect()
    }

    pub fn routers(&self) -> impl Iterator<Item = &RouterId> {
        self.graph.keys()
    }

    pub fn cost(&self, from: &str, to: &str) -> Result<Option<C>, RoutingError<C>> {
        if !self.contains(to) {
            return Err(RoutingError::unknown(to));
        }
        Ok(self.neighbors(from)?.get(to).copied())
    }

    pub fn contains(&self, router: &str) -> bool {
        self.graph.contains_key(router)
    }

    pub fn len(&self) -> usize {
        self.graph.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    pub fn link_count(&self) -> usize {
        self.graph.values().map(BTreeMap::len).sum()
    }

    pub fn negative_links(&self) -> Vec<(RouterId, RouterId, C)> {
        self.links()
            .filter(|(_, _, cost)| cost.is_negative())
            .map(|(from, to, cost)| (from.clone(), to.clone(), cost))
            .collect()
    }

    /// Links whose reverse direction is missing or carries another cost.
    pub fn asymmetric_links(&self) -> Vec<(RouterId, RouterId)> {
        self.links()
            .filter(|(from, to, cost)| {
                self.graph
                    .get(*to)
                    .and_then(|row| row.get(*from))
                    .map_or(true, |reverse| reverse.total_cmp(cost).is_ne())
            })
            .map(|(from, to, _)| (from.clone(), to.clone()))
            .collect()
    }

    /// Copy in which every missing reverse link is added with the forward
    /// cost. Reverse links that already exist keep their own cost.
    pub fn symmetrized(&self) -> Self {
        let mut graph = self.graph.clone();
        for (from, to, cost) in self.links() {
            graph
                .entry(to.clone())
                .or_default()
                .entry(from.clone())
                .or_insert(cost);
        }
        Self { graph }
    }

    /// Routers sharing a link with `router` in either direction.
    pub fn adjacent(&self, router: &str) -> BTreeSet<RouterId> {
        let mut out: BTreeSet<RouterId> = self
            .graph
            .get(router)
            .map(|row| row.keys().cloned().collect())
            .unwrap_or_default();
        for (other, row) in &self.graph {
            if row.contains_key(router) {
                out.insert(other.clone());
            }
        }
        out
    }

    pub fn links(&self) -> impl Iterator<Item = (&RouterId, &RouterId, C)> {
        self.graph.iter().flat_map(|(from, row)| {
            row.iter().map(move |(to, cost)| (from, to, *cost))
        })
    }
}
