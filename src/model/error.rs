use std::collections::BTreeMap;

use thiserror::Error;

use super::cost::LinkCost;
use super::topology::RouterId;
use super::vector::DistanceVector;

#[derive(Debug, Error)]
pub enum RoutingError<C: LinkCost> {
    #[error("unknown router {router}{}", referenced_suffix(.referenced_by))]
    UnknownRouter {
        router: RouterId,
        referenced_by: Option<RouterId>,
    },
    #[error("negative cost {cost} on link {from} -> {to}; shortest path first requires non-negative costs")]
    NegativeCost { from: RouterId, to: RouterId, cost: C },
    #[error("distance vectors did not converge within {rounds} rounds")]
    NonConvergence {
        rounds: usize,
        /// Vectors as they stood after the last round; not a final result.
        vectors: BTreeMap<RouterId, DistanceVector<C>>,
    },
}

impl<C: LinkCost> RoutingError<C> {
    pub(crate) fn unknown(router: &str) -> Self {
        Self::UnknownRouter {
            router: RouterId::from(router),
            referenced_by: None,
        }
    }
}

fn referenced_suffix(referenced_by: &Option<RouterId>) -> String {
    referenced_by
        .as_ref()
        .map(|router| format!(" (neighbor of {router})"))
        .unwrap_or_default()
}
