use std::collections::BTreeMap;

use tracing::trace;

use crate::model::{DistanceVector, LinkCost, RouterId};

/// Immutable copy of every router's vector, published at a round boundary.
pub type VectorSnapshot<C> = BTreeMap<RouterId, DistanceVector<C>>;

/// One router's view of a round: its own links plus the vectors its
/// neighbors advertised at the end of the previous round.
#[derive(Debug, Clone, Copy)]
pub struct DvMergeInput<'a, C> {
    pub link_costs: &'a BTreeMap<RouterId, C>,
    pub neighbor_vectors: &'a VectorSnapshot<C>,
}

/// Bellman-Ford relaxation of `vector` against its neighbors' advertised
/// vectors. Neighbors are visited in id order and only strict improvements
/// are taken, so equal-cost ties stay with the lowest neighbor id. Returns
/// whether any entry changed, or whether a neighbor offers a negative route
/// back to the owner.
pub fn merge_neighbor_vectors<C: LinkCost>(
    vector: &mut DistanceVector<C>,
    input: DvMergeInput<'_, C>,
) -> bool {
    let mut changed = false;

    for (neighbor_id, base) in input.link_costs {
        let Some(advertised) = input.neighbor_vectors.get(neighbor_id) else {
            continue;
        };
        for (destination, entry) in advertised.iter() {
            let candidate = base.add_cost(entry.cost);
            if destination == vector.owner() {
                // The self entry stays at zero, but a negative walk back to
                // the owner is a negative cycle and must keep the round open.
                if candidate.is_negative() {
                    trace!(
                        "router {} sees a negative cycle of cost {} via {}",
                        vector.owner(),
                        candidate,
                        neighbor_id
                    );
                    changed = true;
                }
                continue;
            }
            if vector.offer(destination, candidate, neighbor_id) {
                trace!(
                    "router {} learns {} at cost {} via {}",
                    vector.owner(),
                    destination,
                    candidate,
                    neighbor_id
                );
                changed = true;
            }
        }
    }

    changed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_prefers_lower_metric_then_lower_neighbor() {
        let links = BTreeMap::from([(RouterId::from("2"), 1_i64), ("3".into(), 1)]);
        let mut vector = DistanceVector::seeded("1".into(), &links);
        let mut snapshot = VectorSnapshot::new();
        for (id, far) in [("2", 2_i64), ("3", 2)] {
            let mut neighbor = DistanceVector::new(id.into());
            neighbor.offer(&"4".into(), far, &"4".into());
            snapshot.insert(id.into(), neighbor);
        }

        let changed = merge_neighbor_vectors(
            &mut vector,
            DvMergeInput {
                link_costs: &links,
                neighbor_vectors: &snapshot,
            },
        );
        assert!(changed);
        assert_eq!(vector.cost_to("4"), Some(3));
        assert_eq!(vector.next_hop("4").map(RouterId::as_str), Some("2"));
    }

    #[test]
    fn merge_ignores_routes_back_to_self_and_unknown_neighbors() {
        let links = BTreeMap::from([(RouterId::from("B"), 1_i64)]);
        let mut vector = DistanceVector::seeded("A".into(), &links);
        let mut snapshot = VectorSnapshot::new();
        let mut far = DistanceVector::new("Z".into());
        far.offer(&"Y".into(), 1, &"Y".into());
        snapshot.insert("Z".into(), far);
        let mut b = DistanceVector::new("B".into());
        b.offer(&"A".into(), 1, &"A".into());
        snapshot.insert("B".into(), b);

        let changed = merge_neighbor_vectors(
            &mut vector,
            DvMergeInput {
                link_costs: &links,
                neighbor_vectors: &snapshot,
            },
        );
        assert!(!changed);
        assert_eq!(vector.cost_to("A"), Some(0));
        assert_eq!(vector.cost_to("Y"), None);
    }

    #[test]
    fn negative_route_back_to_owner_counts_as_a_change() {
        let links = BTreeMap::from([(RouterId::from("B"), -1_i64)]);
        let mut vector = DistanceVector::seeded("A".into(), &links);
        let mut b = DistanceVector::new("B".into());
        b.offer(&"A".into(), -1, &"A".into());
        let snapshot = VectorSnapshot::from([(RouterId::from("B"), b)]);

        let input = DvMergeInput {
            link_costs: &links,
            neighbor_vectors: &snapshot,
        };
        assert!(merge_neighbor_vectors(&mut vector, input));
        assert!(merge_neighbor_vectors(&mut vector, input));
        assert_eq!(vector.cost_to("A"), Some(0));
        assert_eq!(vector.len(), 2);
    }
}
