pub mod base;
pub mod distance_vector;
pub mod link_state;
pub mod route_compute;

pub use base::RoutingEngine;
pub use distance_vector::{DistanceVectorEngine, DvConfig, DvOutcome, DvRouter, RoundSummary};
pub use link_state::{FloodOutcome, LinkStateConfig, LinkStateDb, LinkStateEngine, Lsa};
