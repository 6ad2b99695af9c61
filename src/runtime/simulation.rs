use anyhow::{bail, Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use crate::model::{compare_reports, Algorithm, Disagreement, LinkCost, SimulationReport, Topology};
use crate::protocols::{
    DistanceVectorEngine, DvConfig, LinkStateConfig, LinkStateEngine, RoutingEngine,
};
use crate::runtime::config::{AlgorithmSelection, SimulationConfig, SymmetryPolicy};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationOptions {
    pub algorithm: AlgorithmSelection,
    pub max_rounds: Option<usize>,
    pub parallel: bool,
    pub symmetry: SymmetryPolicy,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            algorithm: AlgorithmSelection::Both,
            max_rounds: None,
            parallel: false,
            symmetry: SymmetryPolicy::Warn,
        }
    }
}

impl From<&SimulationConfig> for SimulationOptions {
    fn from(cfg: &SimulationConfig) -> Self {
        Self {
            algorithm: cfg.algorithm,
            max_rounds: cfg.max_rounds,
            parallel: cfg.parallel,
            symmetry: cfg.symmetry,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationOutput<C> {
    pub topology: Topology<C>,
    pub reports: Vec<SimulationReport<C>>,
    /// Costs on which the two engines disagree; only filled when both ran.
    pub disagreements: Vec<Disagreement<C>>,
}

pub fn build_engine<C: LinkCost>(
    algorithm: Algorithm,
    options: &SimulationOptions,
) -> Box<dyn RoutingEngine<C>> {
    match algorithm {
        Algorithm::DistanceVector => Box::new(DistanceVectorEngine::new(DvConfig {
            max_rounds: options.max_rounds,
            parallel: options.parallel,
        })),
        Algorithm::LinkState => Box::new(LinkStateEngine::new(LinkStateConfig {
            parallel: options.parallel,
        })),
    }
}

/// Applies the symmetry policy to a freshly loaded topology.
pub fn prepare_topology<C: LinkCost>(
    topology: Topology<C>,
    policy: SymmetryPolicy,
) -> Result<Topology<C>> {
    let asymmetric = topology.asymmetric_links();
    if asymmetric.is_empty() {
        return Ok(topology);
    }
    match policy {
        SymmetryPolicy::Ignore => Ok(topology),
        SymmetryPolicy::Warn => {
            for (from, to) in &asymmetric {
                warn!("link {from} -> {to} has no matching reverse link of equal cost");
            }
            Ok(topology)
        }
        SymmetryPolicy::Strict => {
            let (from, to) = &asymmetric[0];
            bail!(
                "topology has {} asymmetric link(s), first is {from} -> {to}",
                asymmetric.len()
            )
        }
        SymmetryPolicy::Symmetrize => {
            info!("adding reverse links for {} one-way link(s)", asymmetric.len());
            Ok(topology.symmetrized())
        }
    }
}

pub fn run_simulation<C: LinkCost>(
    topology: Topology<C>,
    options: &SimulationOptions,
) -> Result<SimulationOutput<C>> {
    let topology = prepare_topology(topology, options.symmetry)?;
    info!(
        "simulating {:?} over {} router(s) and {} link(s)",
        options.algorithm,
        topology.len(),
        topology.link_count()
    );

    let mut reports = Vec::new();
    for algorithm in options.algorithm.algorithms() {
        let engine = build_engine::<C>(algorithm, options);
        let report = engine
            .run(&topology)
            .with_context(|| format!("{} simulation failed", engine.name()))?;
        reports.push(report);
    }

    let disagreements = match reports.as_slice() {
        [left, right] => compare_reports(left, right),
        _ => Vec::new(),
    };
    for diff in &disagreements {
        warn!(
            "engines disagree on {} -> {}: {:?} vs {:?}",
            diff.router, diff.destination, diff.left, diff.right
        );
    }

    Ok(SimulationOutput {
        topology,
        reports,
        disagreements,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RouterId, RoutingError};

    fn triangle() -> Topology<i64> {
        Topology::from_rows([
            ("R1", vec![("R2", 1), ("R3", 4)]),
            ("R2", vec![("R1", 1), ("R3", 2)]),
            ("R3", vec![("R1", 4), ("R2", 2)]),
        ])
        .expect("valid topology")
    }

    /// Ten routers, strictly positive costs, every pair connected, costs
    /// symmetric.
    fn mesh() -> Topology<i64> {
        let names: Vec<String> = (0..10).map(|i| format!("R{i}")).collect();
        let mut rows: Vec<(String, Vec<(String, i64)>)> =
            names.iter().map(|name| (name.clone(), Vec::new())).collect();
        let mut link = |a: usize, b: usize, cost: i64| {
            rows[a].1.push((names[b].clone(), cost));
            rows[b].1.push((names[a].clone(), cost));
        };
        for i in 0..10 {
            link(i, (i + 1) % 10, (i as i64 * 7) % 5 + 1);
        }
        link(0, 5, 2);
        link(2, 7, 9);
        link(3, 8, 1);
        link(1, 6, 4);
        Topology::from_rows(rows).expect("valid mesh")
    }

    fn costs(report: &SimulationReport<i64>, router: &str) -> Vec<(String, i64)> {
        report
            .table(router)
            .expect("router present")
            .costs()
            .into_iter()
            .map(|(id, cost)| (id.to_string(), cost))
            .collect()
    }

    #[test]
    fn triangle_matches_expected_tables_in_both_engines() {
        let output =
            run_simulation(triangle(), &SimulationOptions::default()).expect("simulation runs");
        assert_eq!(output.reports.len(), 2);
        for report in &output.reports {
            let expect = |pairs: &[(&str, i64)]| {
                pairs
                    .iter()
                    .map(|(id, cost)| (id.to_string(), *cost))
                    .collect::<Vec<_>>()
            };
            assert_eq!(costs(report, "R1"), expect(&[("R1", 0), ("R2", 1), ("R3", 3)]));
            assert_eq!(costs(report, "R2"), expect(&[("R1", 1), ("R2", 0), ("R3", 2)]));
            assert_eq!(costs(report, "R3"), expect(&[("R1", 3), ("R2", 2), ("R3", 0)]));
        }
        assert!(output.disagreements.is_empty());
    }

    #[test]
    fn engines_agree_on_positive_connected_graphs() {
        let output = run_simulation(mesh(), &SimulationOptions::default()).expect("runs");
        let [dv, ls] = output.reports.as_slice() else {
            panic!("both engines should run");
        };
        assert_eq!(dv.cost_matrix(), ls.cost_matrix());
        assert!(output.disagreements.is_empty());
    }

    #[test]
    fn self_distance_is_zero_and_symmetric_input_gives_symmetric_distances() {
        let output = run_simulation(mesh(), &SimulationOptions::default()).expect("runs");
        let routers: Vec<RouterId> = output.topology.all_routers().into_iter().collect();
        for report in &output.reports {
            for a in &routers {
                assert_eq!(report.distance(a.as_str(), a.as_str()), Some(0));
                for b in &routers {
                    assert_eq!(
                        report.distance(a.as_str(), b.as_str()),
                        report.distance(b.as_str(), a.as_str()),
                        "{} {a} <-> {b}",
                        report.algorithm
                    );
                }
            }
        }
    }

    #[test]
    fn next_hop_paths_are_consistent_with_costs() {
        let output = run_simulation(mesh(), &SimulationOptions::default()).expect("runs");
        for report in &output.reports {
            let path = report.path("R0", "R4").expect("R4 reachable");
            let walked: i64 = path
                .windows(2)
                .map(|hop| {
                    output
                        .topology
                        .cost(hop[0].as_str(), hop[1].as_str())
                        .expect("known routers")
                        .expect("consecutive hops share a link")
                })
                .sum();
            assert_eq!(Some(walked), report.distance("R0", "R4"));
        }
    }

    #[test]
    fn disconnected_routers_are_absent_from_both_engines() {
        let topology = Topology::from_rows([
            ("A", vec![("B", 1_i64)]),
            ("B", vec![("A", 1)]),
            ("C", vec![]),
        ])
        .expect("valid topology");
        let output = run_simulation(topology, &SimulationOptions::default()).expect("runs");
        for report in &output.reports {
            assert_eq!(report.distance("A", "C"), None);
            assert_eq!(report.distance("C", "A"), None);
            assert_eq!(report.distance("C", "C"), Some(0));
        }
        assert!(output.disagreements.is_empty());
    }

    #[test]
    fn negative_costs_fail_the_link_state_run() {
        let topology = Topology::from_rows([("A", vec![("B", -1_i64)]), ("B", vec![("A", -1)])])
            .expect("valid topology");
        let options = SimulationOptions {
            algorithm: AlgorithmSelection::LinkState,
            ..SimulationOptions::default()
        };
        let err = run_simulation(topology, &options).expect_err("negative cost");
        assert!(matches!(
            err.downcast_ref::<RoutingError<i64>>(),
            Some(RoutingError::NegativeCost { .. })
        ));
    }

    #[test]
    fn negative_cycle_fails_the_distance_vector_run() {
        let topology = Topology::from_rows([
            ("A", vec![("B", -1_i64)]),
            ("B", vec![("A", -1), ("C", 1)]),
            ("C", vec![("B", 1)]),
        ])
        .expect("valid topology");
        let options = SimulationOptions {
            algorithm: AlgorithmSelection::DistanceVector,
            max_rounds: Some(12),
            ..SimulationOptions::default()
        };
        let err = run_simulation(topology, &options).expect_err("negative cycle");
        assert!(matches!(
            err.downcast_ref::<RoutingError<i64>>(),
            Some(RoutingError::NonConvergence { rounds: 12, .. })
        ));
    }

    #[test]
    fn symmetry_policies() {
        let one_way = || {
            Topology::from_rows([("A", vec![("B", 3_i64)]), ("B", vec![])])
                .expect("valid topology")
        };
        assert!(prepare_topology(one_way(), SymmetryPolicy::Strict).is_err());
        assert_eq!(
            prepare_topology(one_way(), SymmetryPolicy::Warn).expect("warn keeps input"),
            one_way()
        );
        let fixed = prepare_topology(one_way(), SymmetryPolicy::Symmetrize).expect("fixed");
        assert_eq!(fixed.cost("B", "A").expect("known"), Some(3));
    }
}
