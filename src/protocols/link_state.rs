use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::model::{
    Algorithm, LinkCost, RouterId, RoutingError, RoutingTable, SimulationReport, Topology,
};
use crate::protocols::base::RoutingEngine;
use crate::protocols::route_compute::{compute_spf_tree, Graph, ShortestPathTree};

/// Link-state advertisement: one router's neighbor row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lsa<C> {
    pub origin: RouterId,
    pub seq: u64,
    pub links: BTreeMap<RouterId, C>,
}

/// A router's database of the newest advertisement from each origin.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkStateDb<C> {
    records: BTreeMap<RouterId, Lsa<C>>,
}

impl<C> Default for LinkStateDb<C> {
    fn default() -> Self {
        Self {
            records: BTreeMap::new(),
        }
    }
}

impl<C: LinkCost> LinkStateDb<C> {
    /// Installs `lsa` unless a record with the same or a newer sequence
    /// number is already held.
    pub fn upsert(&mut self, lsa: Lsa<C>) -> bool {
        if self
            .records
            .get(&lsa.origin)
            .is_some_and(|current| current.seq >= lsa.seq)
        {
            return false;
        }
        self.records.insert(lsa.origin.clone(), lsa);
        true
    }

    pub fn get(&self, origin: &str) -> Option<&Lsa<C>> {
        self.records.get(origin)
    }

    pub fn records(&self) -> impl Iterator<Item = &Lsa<C>> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn to_graph(&self) -> Graph<C> {
        self.records
            .iter()
            .map(|(origin, lsa)| (origin.clone(), lsa.links.clone()))
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct LinkStateConfig {
    pub parallel: bool,
}

#[derive(Debug, Clone)]
pub struct FloodOutcome<C> {
    pub databases: BTreeMap<RouterId, LinkStateDb<C>>,
    /// Rounds executed, including the final round that installed nothing.
    pub rounds: usize,
}

/// Link-state routing: flood every router's advertisement, then let each
/// router run Dijkstra over its own database.
#[derive(Debug, Clone, Default)]
pub struct LinkStateEngine {
    config: LinkStateConfig,
}

impl LinkStateEngine {
    pub fn new(config: LinkStateConfig) -> Self {
        Self { config }
    }

    /// Hop-by-hop flooding until no database changes. Adjacencies are taken
    /// in both directions, so one-way links still carry advertisements and
    /// every router ends up holding its whole connected component.
    pub fn flood<C: LinkCost>(&self, topology: &Topology<C>) -> FloodOutcome<C> {
        let adjacency: BTreeMap<RouterId, Vec<RouterId>> = topology
            .routers()
            .map(|router| {
                let peers = topology.adjacent(router.as_str()).into_iter().collect();
                (router.clone(), peers)
            })
            .collect();

        let mut databases: BTreeMap<RouterId, LinkStateDb<C>> = topology
            .graph()
            .iter()
            .map(|(origin, links)| {
                let mut db = LinkStateDb::default();
                db.upsert(Lsa {
                    origin: origin.clone(),
                    seq: 1,
                    links: links.clone(),
                });
                (origin.clone(), db)
            })
            .collect();

        let mut rounds = 0;
        loop {
            rounds += 1;
            let snapshot = databases.clone();
            let mut changed = false;
            for (router, db) in &snapshot {
                let Some(peers) = adjacency.get(router) else {
                    continue;
                };
                for peer in peers {
                    debug!("router {router} floods {} LSA(s) to router {peer}", db.len());
                    let Some(target) = databases.get_mut(peer) else {
                        continue;
                    };
                    for lsa in db.records() {
                        changed |= target.upsert(lsa.clone());
                    }
                }
            }
            if !changed {
                break;
            }
        }

        debug!("flooding settled after {rounds} round(s)");
        FloodOutcome { databases, rounds }
    }

    /// Shortest paths from `source` over the full topology.
    pub fn shortest_paths<C: LinkCost>(
        &self,
        topology: &Topology<C>,
        source: &str,
    ) -> Result<ShortestPathTree<C>, RoutingError<C>> {
        ensure_non_negative(topology)?;
        let (source, _) = topology
            .graph()
            .get_key_value(source)
            .ok_or_else(|| RoutingError::unknown(source))?;
        Ok(compute_spf_tree(topology.graph(), source))
    }

    pub fn shortest_path_trees<C: LinkCost>(
        &self,
        topology: &Topology<C>,
    ) -> Result<(BTreeMap<RouterId, ShortestPathTree<C>>, usize), RoutingError<C>> {
        ensure_non_negative(topology)?;
        let flooded = self.flood(topology);

        let compute = |(router, db): (&RouterId, &LinkStateDb<C>)| {
            let tree = compute_spf_tree(&db.to_graph(), router);
            debug!(
                "router {router} computed {} route(s) from {} LSA(s)",
                tree.dist.len(),
                db.len()
            );
            (router.clone(), tree)
        };
        let trees: BTreeMap<RouterId, ShortestPathTree<C>> = if self.config.parallel {
            flooded.databases.par_iter().map(compute).collect()
        } else {
            flooded.databases.iter().map(compute).collect()
        };
        Ok((trees, flooded.rounds))
    }
}

/// Dijkstra is only correct for non-negative costs; refuse before any run.
fn ensure_non_negative<C: LinkCost>(topology: &Topology<C>) -> Result<(), RoutingError<C>> {
    match topology.negative_links().into_iter().next() {
        Some((from, to, cost)) => Err(RoutingError::NegativeCost { from, to, cost }),
        None => Ok(()),
    }
}

impl<C: LinkCost> RoutingEngine<C> for LinkStateEngine {
    fn algorithm(&self) -> Algorithm {
        Algorithm::LinkState
    }

    fn run(&self, topology: &Topology<C>) -> Result<SimulationReport<C>, RoutingError<C>> {
        let (trees, rounds) = self.shortest_path_trees(topology)?;
        info!(
            "link state computed shortest paths for {} router(s) after {rounds} flooding round(s)",
            trees.len()
        );
        let tables = trees
            .iter()
            .map(|(router, tree)| (router.clone(), RoutingTable::from(tree)))
            .collect();
        Ok(SimulationReport {
            algorithm: Algorithm::LinkState,
            rounds,
            tables,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Topology<i64> {
        Topology::from_rows([
            ("R1", vec![("R2", 1), ("R3", 4)]),
            ("R2", vec![("R1", 1), ("R3", 2)]),
            ("R3", vec![("R1", 4), ("R2", 2)]),
        ])
        .expect("valid topology")
    }

    #[test]
    fn lsdb_keeps_newest_sequence() {
        let mut db = LinkStateDb::<i64>::default();
        let lsa = |seq, cost| Lsa {
            origin: "A".into(),
            seq,
            links: BTreeMap::from([(RouterId::from("B"), cost)]),
        };
        assert!(db.upsert(lsa(2, 5)));
        assert!(!db.upsert(lsa(1, 9)));
        assert!(!db.upsert(lsa(2, 9)));
        assert_eq!(db.get("A").map(|record| record.links["B"]), Some(5));
        assert!(db.upsert(lsa(3, 7)));
        assert_eq!(db.to_graph()["A"]["B"], 7);
    }

    #[test]
    fn flooding_reaches_only_the_connected_component() {
        let topology = Topology::from_rows([
            ("A", vec![("B", 1_i64)]),
            ("B", vec![("A", 1), ("C", 1)]),
            ("C", vec![("B", 1)]),
            ("X", vec![("Y", 1)]),
            ("Y", vec![("X", 1)]),
        ])
        .expect("valid topology");
        let flooded = LinkStateEngine::default().flood(&topology);
        assert_eq!(flooded.databases["A"].len(), 3);
        assert!(flooded.databases["A"].get("C").is_some());
        assert!(flooded.databases["A"].get("X").is_none());
        assert_eq!(flooded.databases["Y"].len(), 2);
        assert_eq!(flooded.rounds, 3);
    }

    #[test]
    fn flooding_crosses_one_way_links() {
        let topology = Topology::from_rows([
            ("A", vec![("B", 1_i64)]),
            ("B", vec![("C", 1)]),
            ("C", vec![]),
        ])
        .expect("valid topology");
        let report = LinkStateEngine::default()
            .run(&topology)
            .expect("non-negative");
        assert_eq!(report.distance("A", "C"), Some(2));
        assert_eq!(report.distance("C", "A"), None);
    }

    #[test]
    fn triangle_shortest_paths() {
        let report = LinkStateEngine::default()
            .run(&triangle())
            .expect("non-negative");
        assert_eq!(report.distance("R1", "R3"), Some(3));
        assert_eq!(report.distance("R2", "R1"), Some(1));
        assert_eq!(report.distance("R3", "R1"), Some(3));
        assert_eq!(report.distance("R3", "R3"), Some(0));
        assert_eq!(
            report.table("R1").and_then(|t| t.next_hop("R3")).map(RouterId::as_str),
            Some("R2")
        );
    }

    #[test]
    fn single_source_query_returns_predecessors() {
        let tree = LinkStateEngine::default()
            .shortest_paths(&triangle(), "R3")
            .expect("R3 exists");
        assert_eq!(tree.cost_to("R1"), Some(3));
        assert_eq!(tree.predecessor.get("R1").map(RouterId::as_str), Some("R2"));
        assert!(matches!(
            LinkStateEngine::default().shortest_paths(&triangle(), "R8"),
            Err(RoutingError::UnknownRouter { .. })
        ));
    }

    #[test]
    fn negative_cost_is_rejected() {
        let topology = Topology::from_rows([
            ("A", vec![("B", 1_i64)]),
            ("B", vec![("A", 1), ("C", -3)]),
            ("C", vec![("B", 2)]),
        ])
        .expect("negative costs are accepted by the model");
        match LinkStateEngine::default().run(&topology) {
            Err(RoutingError::NegativeCost { from, to, cost }) => {
                assert_eq!((from.as_str(), to.as_str(), cost), ("B", "C", -3));
            }
            other => panic!("expected a negative cost error, got {other:?}"),
        }
        assert!(matches!(
            LinkStateEngine::default().shortest_paths(&topology, "A"),
            Err(RoutingError::NegativeCost { .. })
        ));
    }

    #[test]
    fn parallel_runs_match_sequential_runs() {
        let topology = triangle();
        let sequential = LinkStateEngine::default()
            .run(&topology)
            .expect("non-negative");
        let parallel = LinkStateEngine::new(LinkStateConfig { parallel: true })
            .run(&topology)
            .expect("non-negative");
        assert_eq!(sequential, parallel);
    }
}
