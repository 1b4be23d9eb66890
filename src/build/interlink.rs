//! Reverse-edge interlinking.
//!
//! Pruned lists are one-directional: `a -> b` says nothing about `b -> a`.
//! Each node therefore also considers every node that chose it. If the
//! union still fits in `R` it is kept whole; otherwise the union is pruned
//! again with the occlusion rule.

use super::prune::occlusion_prune;
use crate::graph::NeighborList;
use crate::pool::Neighbor;
use crate::store::VectorStore;
use rayon::prelude::*;

/// Add reverse edges to a snapshot of pruned lists.
///
/// Every destination is computed from the same snapshot, so the result does
/// not depend on processing order.
pub(crate) fn interlink(
    store: &VectorStore,
    lists: &[NeighborList],
    max_degree: usize,
) -> Vec<NeighborList> {
    let mut incoming: Vec<Vec<u32>> = vec![Vec::new(); lists.len()];
    for (source, list) in lists.iter().enumerate() {
        for &dest in list {
            incoming[dest as usize].push(source as u32);
        }
    }

    (0..lists.len())
        .into_par_iter()
        .map(|node| {
            let own = &lists[node];
            let fresh: Vec<u32> = incoming[node]
                .iter()
                .copied()
                .filter(|id| !own.contains(id))
                .collect();
            if fresh.is_empty() {
                return own.clone();
            }

            let node = node as u32;
            let mut merged: Vec<Neighbor> = own
                .iter()
                .chain(fresh.iter())
                .map(|&id| Neighbor::new(id, store.distance(node, id)))
                .collect();
            merged.sort_by(|a, b| a.cmp_rank(b));

            if merged.len() <= max_degree {
                merged.iter().map(|c| c.id).collect()
            } else {
                occlusion_prune(store, node, &merged, max_degree, merged.len())
            }
        })
        .collect()
}
