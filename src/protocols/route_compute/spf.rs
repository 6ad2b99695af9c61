use std::collections::{BTreeMap, BTreeSet};

use crate::model::{LinkCost, RouterId};

use super::frontier::DistanceFrontier;
use super::{Graph, ShortestPathTree};

/// Dijkstra from `src` over `graph`.
///
/// Costs must be non-negative; callers check this. Nodes never reached are
/// absent from the result rather than carried at an infinite cost. Equal-cost
/// candidates keep whichever predecessor settled first, and the frontier
/// settles equal costs in router id order, so the output is deterministic.
pub fn compute_spf_tree<C: LinkCost>(graph: &Graph<C>, src: &RouterId) -> ShortestPathTree<C> {
    let mut dist: BTreeMap<RouterId, C> = BTreeMap::new();
    let mut predecessor: BTreeMap<RouterId, RouterId> = BTreeMap::new();
    let mut first_hop: BTreeMap<RouterId, RouterId> = BTreeMap::new();
    let mut settled: BTreeSet<RouterId> = BTreeSet::new();
    let mut frontier = DistanceFrontier::new();

    dist.insert(src.clone(), C::zero());
    frontier.push(src.clone(), C::zero());

    loop {
        let Some((u, cost_u)) = frontier.pop_min(|node, cost| {
            if settled.contains(node) {
                return true;
            }
            match dist.get(node) {
                Some(best) => cost.total_cmp(best).is_gt(),
                None => true,
            }
        }) else {
            break;
        };

        let Some(neighbors) = graph.get(&u) else {
            settled.insert(u);
            continue;
        };
        for (v, edge_cost) in neighbors {
            if settled.contains(v) || v == src {
                continue;
            }
            let candidate = cost_u.add_cost(*edge_cost);
            let better = dist
                .get(v)
                .map_or(true, |best| candidate.improves_on(best));
            if !better {
                continue;
            }

            let hop = if u == *src {
                v.clone()
            } else {
                first_hop.get(&u).cloned().unwrap_or_else(|| v.clone())
            };
            dist.insert(v.clone(), candidate);
            predecessor.insert(v.clone(), u.clone());
            first_hop.insert(v.clone(), hop);
            frontier.push(v.clone(), candidate);
        }
        settled.insert(u);
    }

    ShortestPathTree {
        source: src.clone(),
        dist,
        predecessor,
        first_hop,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(rows: Vec<(&str, Vec<(&str, i64)>)>) -> Graph<i64> {
        rows.into_iter()
            .map(|(router, links)| {
                let links = links
                    .into_iter()
                    .map(|(neighbor, cost)| (RouterId::from(neighbor), cost))
                    .collect();
                (RouterId::from(router), links)
            })
            .collect()
    }

    #[test]
    fn spf_tree_on_triangle() {
        let graph = graph(vec![
            ("R1", vec![("R2", 1), ("R3", 4)]),
            ("R2", vec![("R1", 1), ("R3", 2)]),
            ("R3", vec![("R1", 4), ("R2", 2)]),
        ]);
        let tree = compute_spf_tree(&graph, &"R1".into());
        assert_eq!(tree.cost_to("R1"), Some(0));
        assert_eq!(tree.cost_to("R2"), Some(1));
        assert_eq!(tree.cost_to("R3"), Some(3));
        assert_eq!(tree.first_hop.get("R3").map(RouterId::as_str), Some("R2"));
        let path = tree.path_to("R3").expect("R3 reachable");
        assert_eq!(
            path.iter().map(RouterId::as_str).collect::<Vec<_>>(),
            vec!["R1", "R2", "R3"]
        );
    }

    #[test]
    fn spf_prefers_lower_router_id_on_equal_cost() {
        let graph = graph(vec![
            ("1", vec![("2", 1), ("3", 1)]),
            ("2", vec![("4", 1)]),
            ("3", vec![("4", 1)]),
            ("4", vec![]),
        ]);
        let tree = compute_spf_tree(&graph, &"1".into());
        assert_eq!(tree.cost_to("4"), Some(2));
        assert_eq!(tree.predecessor.get("4").map(RouterId::as_str), Some("2"));
        assert_eq!(tree.first_hop.get("4").map(RouterId::as_str), Some("2"));
    }

    #[test]
    fn unreachable_nodes_are_absent() {
        let graph = graph(vec![("A", vec![("B", 3)]), ("B", vec![("A", 3)]), ("C", vec![])]);
        let tree = compute_spf_tree(&graph, &"A".into());
        assert_eq!(tree.cost_to("C"), None);
        assert_eq!(tree.path_to("C"), None);
        assert_eq!(tree.dist.len(), 2);
    }
}
