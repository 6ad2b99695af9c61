pub mod cost;
pub mod error;
pub mod routing;
pub mod topology;
pub mod vector;

pub use cost::LinkCost;
pub use error::RoutingError;
pub use routing::{
    compare_reports, Algorithm, Disagreement, RouteEntry, RoutingTable, SimulationReport,
};
pub use topology::{Graph, RouterId, Topology};
pub use vector::{DistanceVector, VectorEntry};
