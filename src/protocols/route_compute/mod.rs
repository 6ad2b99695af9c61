mod dv;
mod frontier;
mod spf;
mod types;

pub use dv::{merge_neighbor_vectors, DvMergeInput, VectorSnapshot};
pub use frontier::DistanceFrontier;
pub use spf::compute_spf_tree;
pub use types::{Graph, ShortestPathTree};
