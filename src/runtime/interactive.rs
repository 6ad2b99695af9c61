use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::str::FromStr;

use anyhow::{bail, Context, Result};

use crate::model::{RouterId, RoutingError, Topology};
use crate::runtime::config::{AlgorithmSelection, SymmetryPolicy};
use crate::runtime::render::{render_report, render_topology, render_unconverged};
use crate::runtime::simulation::{run_simulation, SimulationOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuChoice {
    DistanceVector,
    LinkState,
    Exit,
}

/// Prompt-driven session: read a topology, then loop on the algorithm menu.
pub struct InteractiveSession<R, W> {
    input: R,
    output: W,
    options: SimulationOptions,
}

impl<R: BufRead, W: Write> InteractiveSession<R, W> {
    pub fn new(input: R, output: W, options: SimulationOptions) -> Self {
        Self {
            input,
            output,
            options,
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    pub fn run(&mut self) -> Result<()> {
        let topology = self.read_topology()?;
        writeln!(self.output)?;
        render_topology(&mut self.output, &topology)?;

        loop {
            let Some(choice) = self.read_choice()? else {
                writeln!(self.output, "Exiting the application.")?;
                return Ok(());
            };
            let algorithm = match choice {
                MenuChoice::DistanceVector => AlgorithmSelection::DistanceVector,
                MenuChoice::LinkState => AlgorithmSelection::LinkState,
                MenuChoice::Exit => {
                    writeln!(self.output, "Exiting the application.")?;
                    return Ok(());
                }
            };
            self.simulate(&topology, algorithm)?;
        }
    }

    pub fn read_topology(&mut self) -> Result<Topology<i64>> {
        let count: usize = self.prompt_parsed("Enter the number of routers: ")?;
        let mut rows: BTreeMap<RouterId, BTreeMap<RouterId, i64>> = BTreeMap::new();
        for _ in 0..count {
            let router = self.prompt_router_id("Enter router ID (e.g., R1, R2): ")?;
            let neighbor_count: usize =
                self.prompt_parsed(&format!("Enter the number of neighbors for {router}: "))?;
            let mut links = BTreeMap::new();
            for _ in 0..neighbor_count {
                let neighbor =
                    self.prompt_router_id(&format!("Enter neighbor router ID for {router}: "))?;
                let cost: i64 = self
                    .prompt_parsed(&format!("Enter cost to reach {neighbor} from {router}: "))?;
                links.insert(neighbor, cost);
            }
            rows.insert(router, links);
        }
        if rows.is_empty() {
            bail!("topology has no routers");
        }
        Ok(Topology::new(rows)?)
    }

    fn simulate(&mut self, topology: &Topology<i64>, algorithm: AlgorithmSelection) -> Result<()> {
        let options = SimulationOptions {
            algorithm,
            // The operator typed this topology in; one-way links are intentional.
            symmetry: SymmetryPolicy::Ignore,
            ..self.options.clone()
        };
        match run_simulation(topology.clone(), &options) {
            Ok(output) => {
                for report in &output.reports {
                    render_report(&mut self.output, report, false)?;
                }
            }
            Err(err) => {
                if let Some(RoutingError::NonConvergence { rounds, vectors }) =
                    err.downcast_ref::<RoutingError<i64>>()
                {
                    render_unconverged(&mut self.output, *rounds, vectors)?;
                }
                writeln!(self.output, "Simulation failed: {err:#}")?;
            }
        }
        Ok(())
    }

    /// `None` on end of input.
    fn read_choice(&mut self) -> Result<Option<MenuChoice>> {
        loop {
            writeln!(self.output, "\nChoose Routing Algorithm:")?;
            writeln!(self.output, "1. Distance Vector Routing")?;
            writeln!(self.output, "2. Link State Routing")?;
            writeln!(self.output, "3. Exit")?;
            let Some(line) = self.prompt("Enter choice (1/2/3): ")? else {
                return Ok(None);
            };
            match line.as_str() {
                "1" => return Ok(Some(MenuChoice::DistanceVector)),
                "2" => return Ok(Some(MenuChoice::LinkState)),
                "3" => return Ok(Some(MenuChoice::Exit)),
                _ => writeln!(self.output, "Invalid choice! Please enter 1, 2, or 3.")?,
            }
        }
    }

    fn prompt(&mut self, message: &str) -> Result<Option<String>> {
        write!(self.output, "{message}")?;
        self.output.flush()?;
        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("failed to read from input")?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn prompt_required(&mut self, message: &str) -> Result<String> {
        match self.prompt(message)? {
            Some(line) => Ok(line),
            None => bail!("input ended while reading the topology"),
        }
    }

    fn prompt_parsed<T: FromStr>(&mut self, message: &str) -> Result<T> {
        loop {
            let line = self.prompt_required(message)?;
            match line.parse() {
                Ok(value) => return Ok(value),
                Err(_) => writeln!(self.output, "Invalid number: {line:?}")?,
            }
        }
    }

    fn prompt_router_id(&mut self, message: &str) -> Result<RouterId> {
        loop {
            let line = self.prompt_required(message)?;
            if !line.is_empty() {
                return Ok(RouterId::from(line));
            }
            writeln!(self.output, "Router ID must not be empty")?;
        }
    }
}
