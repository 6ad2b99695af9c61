use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use routesim::model::{LinkCost, RoutingError, Topology};
use routesim::runtime::config::{load_simulation_config, AlgorithmSelection, TopologyInput};
use routesim::runtime::render::{render_output, render_unconverged, OutputFormat};
use routesim::runtime::simulation::{run_simulation, SimulationOptions};
use routesim::runtime::InteractiveSession;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "routesim")]
#[command(about = "Simulate distance-vector and link-state routing over a router graph")]
struct Args {
    #[arg(long, global = true, default_value = "INFO")]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run a simulation over a topology file.
    Run {
        #[arg(long)]
        config: PathBuf,
        #[arg(long)]
        algorithm: Option<AlgorithmSelection>,
        #[arg(long)]
        max_rounds: Option<usize>,
        #[arg(long)]
        parallel: bool,
        #[arg(long, default_value = "text")]
        format: OutputFormat,
        /// Print next hop and path for every route.
        #[arg(long)]
        detail: bool,
    },
    /// Enter a topology at the prompt and pick algorithms from a menu.
    Interactive {
        #[arg(long)]
        max_rounds: Option<usize>,
        #[arg(long)]
        parallel: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level)?;

    match args.command {
        Command::Run {
            config,
            algorithm,
            max_rounds,
            parallel,
            format,
            detail,
        } => {
            let cfg = load_simulation_config(&config)?;
            let mut options = SimulationOptions::from(&cfg);
            if let Some(algorithm) = algorithm {
                options.algorithm = algorithm;
            }
            if max_rounds.is_some() {
                options.max_rounds = max_rounds;
            }
            options.parallel |= parallel;
            anyhow::ensure!(options.max_rounds != Some(0), "--max-rounds must be at least 1");

            match cfg.topology {
                TopologyInput::Integer(topology) => simulate(topology, &options, format, detail),
                TopologyInput::Real(topology) => simulate(topology, &options, format, detail),
            }
        }
        Command::Interactive {
            max_rounds,
            parallel,
        } => {
            let options = SimulationOptions {
                max_rounds,
                parallel,
                ..SimulationOptions::default()
            };
            let stdin = io::stdin();
            let mut session = InteractiveSession::new(stdin.lock(), io::stdout().lock(), options);
            session.run()
        }
    }
}

fn simulate<C: LinkCost>(
    topology: Topology<C>,
    options: &SimulationOptions,
    format: OutputFormat,
    detail: bool,
) -> Result<()> {
    let mut stdout = io::stdout().lock();
    match run_simulation(topology, options) {
        Ok(output) => render_output(&mut stdout, &output, format, detail),
        Err(err) => {
            if let Some(RoutingError::NonConvergence { rounds, vectors }) =
                err.downcast_ref::<RoutingError<C>>()
            {
                render_unconverged(&mut stdout, *rounds, vectors)?;
                stdout.flush()?;
            }
            Err(err)
        }
    }
}

fn init_logging(level: &str) -> Result<()> {
    let level = level.parse::<Level>()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .compact()
        .init();
    Ok(())
}
