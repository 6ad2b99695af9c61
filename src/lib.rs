//! Distance-vector and link-state routing over a weighted router graph.

pub mod model;
pub mod protocols;
pub mod runtime;

pub use model::{LinkCost, RouterId, RoutingError, RoutingTable, SimulationReport, Topology};
pub use protocols::{DistanceVectorEngine, LinkStateEngine, RoutingEngine};
