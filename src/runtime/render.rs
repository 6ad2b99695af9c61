use std::collections::BTreeMap;
use std::io::Write;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

use crate::model::{
    Algorithm, DistanceVector, LinkCost, RouterId, SimulationReport, Topology,
};
use crate::runtime::simulation::SimulationOutput;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => bail!("unsupported output format: {other}"),
        }
    }
}

/// `{R1: 0, R2: 1}` with the owning router listed first.
pub fn format_costs<C: LinkCost>(owner: &RouterId, costs: &BTreeMap<RouterId, C>) -> String {
    let own = costs.get(owner).map(|cost| (owner, cost));
    let rest = costs.iter().filter(|(id, _)| *id != owner);
    let body: Vec<String> = own
        .into_iter()
        .chain(rest)
        .map(|(id, cost)| format!("{id}: {cost}"))
        .collect();
    format!("{{{}}}", body.join(", "))
}

pub fn render_topology<C: LinkCost, W: Write>(out: &mut W, topology: &Topology<C>) -> Result<()> {
    writeln!(out, "Network Topology:")?;
    for (router, neighbors) in topology.graph() {
        let body: Vec<String> = neighbors
            .iter()
            .map(|(neighbor, cost)| format!("{neighbor}: {cost}"))
            .collect();
        writeln!(out, "{router}: {{{}}}", body.join(", "))?;
    }
    Ok(())
}

pub fn render_report<C: LinkCost, W: Write>(
    out: &mut W,
    report: &SimulationReport<C>,
    detail: bool,
) -> Result<()> {
    let title = match report.algorithm {
        Algorithm::DistanceVector => "Distance Vector Routing Simulation",
        Algorithm::LinkState => "Link State Routing Simulation",
    };
    writeln!(out, "\n{title}\n")?;

    for (router, table) in &report.tables {
        writeln!(
            out,
            "Router {router} {}: {}",
            report.algorithm.result_label(),
            format_costs(router, &table.costs())
        )?;
        if !detail {
            continue;
        }
        for route in table.routes().filter(|route| route.destination != *router) {
            let path = report
                .path(router.as_str(), route.destination.as_str())
                .map(|hops| {
                    hops.iter()
                        .map(RouterId::as_str)
                        .collect::<Vec<_>>()
                        .join(" -> ")
                })
                .unwrap_or_else(|| "-".to_string());
            let next_hop = route
                .next_hop
                .as_ref()
                .map_or("-", RouterId::as_str);
            writeln!(
                out,
                "    {} cost {} next hop {next_hop} path {path}",
                route.destination, route.cost
            )?;
        }
    }

    match report.algorithm {
        Algorithm::DistanceVector => {
            writeln!(out, "\nConverged after {} round(s)", report.rounds)?
        }
        Algorithm::LinkState => {
            writeln!(out, "\nFlooding settled after {} round(s)", report.rounds)?
        }
    }
    Ok(())
}

pub fn render_output<C: LinkCost, W: Write>(
    out: &mut W,
    output: &SimulationOutput<C>,
    format: OutputFormat,
    detail: bool,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, output)
                .context("failed to encode simulation output")?;
            writeln!(out)?;
        }
        OutputFormat::Text => {
            render_topology(out, &output.topology)?;
            for report in &output.reports {
                render_report(out, report, detail)?;
            }
            if output.reports.len() > 1 {
                if output.disagreements.is_empty() {
                    writeln!(out, "\nBoth algorithms agree on every shortest path cost")?;
                } else {
                    writeln!(
                        out,
                        "\nAlgorithms disagree on {} cost(s)",
                        output.disagreements.len()
                    )?;
                }
            }
        }
    }
    Ok(())
}

/// Last vectors of a run that hit its round cap. They are not final.
pub fn render_unconverged<C: LinkCost, W: Write>(
    out: &mut W,
    rounds: usize,
    vectors: &BTreeMap<RouterId, DistanceVector<C>>,
) -> Result<()> {
    writeln!(
        out,
        "\nDistance vectors did NOT converge within {rounds} round(s); last vectors:\n"
    )?;
    for (router, vector) in vectors {
        writeln!(
            out,
            "Router {router} Distance Vector (not converged): {}",
            format_costs(router, &vector.costs())
        )?;
    }
    Ok(())
}
