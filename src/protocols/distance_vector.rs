use std::collections::{BTreeMap, BTreeSet};

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::model::{
    Algorithm, DistanceVector, LinkCost, RouterId, RoutingError, RoutingTable, SimulationReport,
    Topology,
};
use crate::protocols::base::RoutingEngine;
use crate::protocols::route_compute::{merge_neighbor_vectors, DvMergeInput, VectorSnapshot};

#[derive(Debug, Clone, Default)]
pub struct DvConfig {
    /// Rounds allowed before giving up. Defaults to one more than the router
    /// count, which is enough for any graph without a negative cycle.
    pub max_rounds: Option<usize>,
    pub parallel: bool,
}

impl DvConfig {
    pub fn round_cap(&self, router_count: usize) -> usize {
        self.max_rounds.unwrap_or(router_count + 1).max(1)
    }
}

/// A router's private state: its own links and the vector only it mutates.
#[derive(Debug, Clone)]
pub struct DvRouter<C> {
    id: RouterId,
    links: BTreeMap<RouterId, C>,
    vector: DistanceVector<C>,
}

impl<C: LinkCost> DvRouter<C> {
    pub fn new(id: RouterId, links: BTreeMap<RouterId, C>) -> Self {
        let vector = DistanceVector::seeded(id.clone(), &links);
        Self { id, links, vector }
    }

    pub fn id(&self) -> &RouterId {
        &self.id
    }

    pub fn links(&self) -> &BTreeMap<RouterId, C> {
        &self.links
    }

    pub fn vector(&self) -> &DistanceVector<C> {
        &self.vector
    }

    fn advertise(&self, round: usize) {
        for neighbor_id in self.links.keys() {
            debug!(
                "round {round}: router {} sends distance vector to router {neighbor_id}",
                self.id
            );
        }
    }

    fn receive(&mut self, snapshot: &VectorSnapshot<C>) -> bool {
        merge_neighbor_vectors(
            &mut self.vector,
            DvMergeInput {
                link_costs: &self.links,
                neighbor_vectors: snapshot,
            },
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundSummary {
    pub round: usize,
    pub changed: BTreeSet<RouterId>,
}

impl RoundSummary {
    pub fn converged(&self) -> bool {
        self.changed.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct DvOutcome<C> {
    pub vectors: BTreeMap<RouterId, DistanceVector<C>>,
    /// Rounds executed, including the final round that changed nothing.
    pub rounds: usize,
}

/// Synchronous-round simulation of distance-vector routing.
///
/// Each round every router reads the vectors its neighbors held at the end
/// of the previous round and relaxes its own. Nobody sees a vector produced
/// in the same round, so results do not depend on router order, and the
/// parallel mode gives the same answer as the sequential one.
#[derive(Debug, Clone, Default)]
pub struct DistanceVectorEngine {
    config: DvConfig,
}

impl DistanceVectorEngine {
    pub fn new(config: DvConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DvConfig {
        &self.config
    }

    pub fn initial_routers<C: LinkCost>(
        &self,
        topology: &Topology<C>,
    ) -> BTreeMap<RouterId, DvRouter<C>> {
        topology
            .graph()
            .iter()
            .map(|(id, links)| (id.clone(), DvRouter::new(id.clone(), links.clone())))
            .collect()
    }

    /// Runs one exchange round over `routers` and reports who changed.
    pub fn run_round<C: LinkCost>(
        &self,
        round: usize,
        routers: &mut BTreeMap<RouterId, DvRouter<C>>,
    ) -> RoundSummary {
        for router in routers.values() {
            router.advertise(round);
        }
        let snapshot: VectorSnapshot<C> = routers
            .iter()
            .map(|(id, router)| (id.clone(), router.vector.clone()))
            .collect();

        // Collecting is the round barrier.
        let changed: BTreeSet<RouterId> = if self.config.parallel {
            routers
                .par_iter_mut()
                .filter_map(|(id, router)| router.receive(&snapshot).then(|| id.clone()))
                .collect()
        } else {
            routers
                .iter_mut()
                .filter_map(|(id, router)| router.receive(&snapshot).then(|| id.clone()))
                .collect()
        };

        debug!("round {round}: {} router(s) changed {:?}", changed.len(), changed);
        RoundSummary { round, changed }
    }

    pub fn converge<C: LinkCost>(
        &self,
        topology: &Topology<C>,
    ) -> Result<DvOutcome<C>, RoutingError<C>> {
        let mut routers = self.initial_routers(topology);
        let cap = self.config.round_cap(topology.len());

        for round in 1..=cap {
            let summary = self.run_round(round, &mut routers);
            if summary.converged() {
                info!(
                    "distance vector converged after {round} round(s) over {} router(s)",
                    routers.len()
                );
                return Ok(DvOutcome {
                    vectors: into_vectors(routers),
                    rounds: round,
                });
            }
        }

        warn!("distance vector still changing after {cap} round(s); giving up");
        Err(RoutingError::NonConvergence {
            rounds: cap,
            vectors: into_vectors(routers),
        })
    }
}

fn into_vectors<C>(routers: BTreeMap<RouterId, DvRouter<C>>) -> BTreeMap<RouterId, DistanceVector<C>> {
    routers
        .into_iter()
        .map(|(id, router)| (id, router.vector))
        .collect()
}

impl<C: LinkCost> RoutingEngine<C> for DistanceVectorEngine {
    fn algorithm(&self) -> Algorithm {
        Algorithm::DistanceVector
    }

    fn run(&self, topology: &Topology<C>) -> Result<SimulationReport<C>, RoutingError<C>> {
        let outcome = self.converge(topology)?;
        let tables = outcome
            .vectors
            .iter()
            .map(|(id, vector)| (id.clone(), RoutingTable::from(vector)))
            .collect();
        Ok(SimulationReport {
            algorithm: Algorithm::DistanceVector,
            rounds: outcome.rounds,
            tables,
        })
    }
}
