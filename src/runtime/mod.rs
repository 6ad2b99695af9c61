pub mod config;
pub mod interactive;
pub mod render;
pub mod simulation;

pub use config::{
    load_simulation_config, parse_simulation_config, AlgorithmSelection, SimulationConfig,
    SymmetryPolicy, TopologyInput,
};
pub use interactive::InteractiveSession;
pub use render::{render_output, render_unconverged, OutputFormat};
pub use simulation::{run_simulation, SimulationOptions, SimulationOutput};
