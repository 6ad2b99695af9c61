use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::model::{Algorithm, Graph, RouterId, Topology};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlgorithmSelection {
    DistanceVector,
    LinkState,
    Both,
}

impl AlgorithmSelection {
    pub fn algorithms(&self) -> Vec<Algorithm> {
        match self {
            Self::DistanceVector => vec![Algorithm::DistanceVector],
            Self::LinkState => vec![Algorithm::LinkState],
            Self::Both => vec![Algorithm::DistanceVector, Algorithm::LinkState],
        }
    }
}

impl FromStr for AlgorithmSelection {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_lowercase().replace('-', "_").as_str() {
            "distance_vector" | "dv" => Ok(Self::DistanceVector),
            "link_state" | "ls" => Ok(Self::LinkState),
            "both" | "all" => Ok(Self::Both),
            other => bail!("unsupported algorithm: {other}"),
        }
    }
}

/// What to do with links whose reverse direction is missing or differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymmetryPolicy {
    Ignore,
    Warn,
    Strict,
    Symmetrize,
}

impl FromStr for SymmetryPolicy {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_lowercase().as_str() {
            "ignore" => Ok(Self::Ignore),
            "warn" => Ok(Self::Warn),
            "strict" => Ok(Self::Strict),
            "symmetrize" => Ok(Self::Symmetrize),
            other => bail!("unsupported symmetry policy: {other}"),
        }
    }
}

/// Topology as loaded from a file. Integer-only inputs stay integral; a
/// single fractional cost makes the whole topology real-valued.
#[derive(Debug, Clone, PartialEq)]
pub enum TopologyInput {
    Integer(Topology<i64>),
    Real(Topology<f64>),
}

impl TopologyInput {
    pub fn router_count(&self) -> usize {
        match self {
            Self::Integer(topology) => topology.len(),
            Self::Real(topology) => topology.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub algorithm: AlgorithmSelection,
    pub max_rounds: Option<usize>,
    pub parallel: bool,
    pub symmetry: SymmetryPolicy,
    pub topology: TopologyInput,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawCost {
    Integer(i64),
    Real(f64),
}

#[derive(Debug, Deserialize)]
struct RawSimulationConfig {
    algorithm: Option<String>,
    max_rounds: Option<usize>,
    parallel: Option<bool>,
    symmetry: Option<String>,
    topology: BTreeMap<String, Option<BTreeMap<String, RawCost>>>,
}

pub fn load_simulation_config(path: &Path) -> Result<SimulationConfig> {
    let raw_text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    parse_simulation_config(&raw_text)
        .with_context(|| format!("invalid simulation config {}", path.display()))
}

/// Parses YAML (or JSON, which YAML accepts) simulation settings.
pub fn parse_simulation_config(text: &str) -> Result<SimulationConfig> {
    let raw_cfg: RawSimulationConfig =
        serde_yaml::from_str(text).context("failed to parse simulation config yaml")?;

    let algorithm = raw_cfg
        .algorithm
        .as_deref()
        .map(AlgorithmSelection::from_str)
        .transpose()?
        .unwrap_or(AlgorithmSelection::Both);
    let symmetry = raw_cfg
        .symmetry
        .as_deref()
        .map(SymmetryPolicy::from_str)
        .transpose()?
        .unwrap_or(SymmetryPolicy::Warn);
    if raw_cfg.max_rounds == Some(0) {
        bail!("max_rounds must be at least 1");
    }

    Ok(SimulationConfig {
        algorithm,
        max_rounds: raw_cfg.max_rounds,
        parallel: raw_cfg.parallel.unwrap_or(false),
        symmetry,
        topology: build_topology_input(raw_cfg.topology)?,
    })
}

fn build_topology_input(
    raw: BTreeMap<String, Option<BTreeMap<String, RawCost>>>,
) -> Result<TopologyInput> {
    if raw.is_empty() {
        bail!("topology has no routers");
    }
    let rows: Vec<(RouterId, BTreeMap<RouterId, RawCost>)> = raw
        .into_iter()
        .map(|(router, links)| {
            let router = parse_router_id(&router)?;
            let links = links
                .unwrap_or_default()
                .into_iter()
                .map(|(neighbor, cost)| Ok((parse_router_id(&neighbor)?, cost)))
                .collect::<Result<BTreeMap<_, _>>>()?;
            Ok((router, links))
        })
        .collect::<Result<_>>()?;

    let integral = rows
        .iter()
        .flat_map(|(_, links)| links.values())
        .all(|cost| matches!(cost, RawCost::Integer(_)));

    if integral {
        let graph: Graph<i64> = rows
            .into_iter()
            .map(|(router, links)| {
                let links = links
                    .into_iter()
                    .map(|(neighbor, cost)| match cost {
                        RawCost::Integer(value) => (neighbor, value),
                        RawCost::Real(value) => (neighbor, value as i64),
                    })
                    .collect();
                (router, links)
            })
            .collect();
        return Ok(TopologyInput::Integer(Topology::new(graph)?));
    }

    let graph: Graph<f64> = rows
        .into_iter()
        .map(|(router, links)| {
            let links = links
                .into_iter()
                .map(|(neighbor, cost)| match cost {
                    RawCost::Integer(value) => (neighbor, value as f64),
                    RawCost::Real(value) => (neighbor, value),
                })
                .collect();
            (router, links)
        })
        .collect();
    if let Some((from, to, cost)) = graph
        .iter()
        .flat_map(|(from, row)| row.iter().map(move |(to, cost)| (from, to, *cost)))
        .find(|(_, _, cost)| !cost.is_finite())
    {
        bail!("link {from} -> {to} has non-finite cost {cost}");
    }
    Ok(TopologyInput::Real(Topology::new(graph)?))
}

fn parse_router_id(raw: &str) -> Result<RouterId> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        bail!("router id must not be empty");
    }
    Ok(RouterId::from(trimmed))
}
