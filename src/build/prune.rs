//! Occlusion pruning.
//!
//! Candidates are visited nearest first. A candidate `c` is rejected when an
//! already accepted neighbor `p` is strictly closer to `c` than the node
//! itself is:
//!
//! ```text
//!        p ●───── d(p,c) ─────● c        reject c  if d(p,c) < d(v,c)
//!          │                 ╱
//!   d(v,p) │        d(v,c)  ╱
//!          ● v ────────────╯
//! ```
//!
//! The comparison is strict with no tolerance: a candidate coincident with
//! the node (`d(v,c) == 0`) is never shadowed, and ties are kept.

use crate::graph::NeighborList;
use crate::knn::KnnGraph;
use crate::pool::Neighbor;
use crate::store::VectorStore;

/// Merge the expansion's full set with `node`'s own k-NN list into a
/// deduplicated candidate list sorted by `(distance, id)`, excluding `node`.
pub(crate) fn collect_candidates(
    store: &VectorStore,
    knn: &KnnGraph,
    node: u32,
    mut full: Vec<Neighbor>,
) -> Vec<Neighbor> {
    full.extend(
        knn.neighbors(node)
            .iter()
            .map(|&id| Neighbor::new(id, store.distance(node, id))),
    );
    full.retain(|c| c.id != node);
    full.sort_by(|a, b| a.cmp_rank(b));
    // Equal ids carry equal distances, so duplicates end up adjacent.
    full.dedup_by_key(|c| c.id);
    full
}

/// Select at most `max_degree` diverse neighbors for `node`.
///
/// `candidates` must be sorted by `(distance, id)` and free of `node` and of
/// duplicates. Only the first `max_candidates` are examined.
pub(crate) fn occlusion_prune(
    store: &VectorStore,
    node: u32,
    candidates: &[Neighbor],
    max_degree: usize,
    max_candidates: usize,
) -> NeighborList {
    let mut accepted = NeighborList::new();

    for candidate in candidates.iter().take(max_candidates) {
        if accepted.len() >= max_degree {
            break;
        }
        if candidate.id == node {
            continue;
        }
        let shadowed = accepted
            .iter()
            .any(|&p| store.distance(p, candidate.id) < candidate.distance);
        if !shadowed {
            accepted.push(candidate.id);
        }
    }

    accepted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(xs: &[f32]) -> VectorStore {
        let rows: Vec<Vec<f32>> = xs.iter().map(|&x| vec![x, 0.0]).collect();
        VectorStore::from_rows(&rows, 2).unwrap()
    }

    fn ranked(store: &VectorStore, node: u32, ids: &[u32]) -> Vec<Neighbor> {
        let knn = KnnGraph::from_lists(vec![Vec::new(); store.len()]);
        let full = ids
            .iter()
            .map(|&id| Neighbor::new(id, store.distance(node, id)))
            .collect();
        collect_candidates(store, &knn, node, full)
    }

    #[test]
    fn collinear_points_keep_only_adjacent() {
        let store = line(&[0.0, 1.0, 2.0, 3.0, 4.0]);
        let cands = ranked(&store, 2, &[0, 1, 3, 4]);
        let kept = occlusion_prune(&store, 2, &cands, 4, 100);
        assert_eq!(kept.as_slice(), &[1, 3]);
    }

    #[test]
    fn end_of_line_keeps_one() {
        let store = line(&[0.0, 1.0, 2.0, 3.0]);
        let cands = ranked(&store, 0, &[1, 2, 3]);
        let kept = occlusion_prune(&store, 0, &cands, 4, 100);
        assert_eq!(kept.as_slice(), &[1]);
    }

    #[test]
    fn orthogonal_directions_are_kept() {
        let rows = vec![
            vec![0.0, 0.0],
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![-1.0, 0.0],
            vec![0.0, -1.0],
        ];
        let store = VectorStore::from_rows(&rows, 2).unwrap();
        let cands = ranked(&store, 0, &[1, 2, 3, 4]);
        let kept = occlusion_prune(&store, 0, &cands, 8, 100);
        assert_eq!(kept.len(), 4);
    }

    #[test]
    fn degree_cap_is_respected() {
        let rows = vec![
            vec![0.0, 0.0],
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![-1.0, 0.0],
        ];
        let store = VectorStore::from_rows(&rows, 2).unwrap();
        let cands = ranked(&store, 0, &[1, 2, 3]);
        let kept = occlusion_prune(&store, 0, &cands, 2, 100);
        assert_eq!(kept.as_slice(), &[1, 2]);
    }

    #[test]
    fn max_candidates_limits_examination() {
        let rows = vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![0.0, 2.0]];
        let store = VectorStore::from_rows(&rows, 2).unwrap();
        let cands = ranked(&store, 0, &[1, 2]);
        let kept = occlusion_prune(&store, 0, &cands, 8, 1);
        assert_eq!(kept.as_slice(), &[1]);
    }

    #[test]
    fn coincident_points() {
        let store = line(&[0.0, 1.0, 1.0]);
        let cands = ranked(&store, 0, &[1, 2]);
        // d(1,2) = 0 < d(0,2) = 1, so 2 hides behind 1.
        let kept = occlusion_prune(&store, 0, &cands, 8, 100);
        assert_eq!(kept.as_slice(), &[1]);

        // Seen from 1, its twin 2 is at distance 0 and cannot be shadowed.
        let cands = ranked(&store, 1, &[2, 0]);
        let kept = occlusion_prune(&store, 1, &cands, 8, 100);
        assert_eq!(kept.as_slice(), &[2, 0]);
    }

    #[test]
    fn collect_dedups_and_excludes_self() {
        let store = line(&[0.0, 1.0, 2.0]);
        let knn = KnnGraph::from_lists(vec![vec![1, 0, 2], vec![], vec![]]);
        let full = vec![Neighbor::new(2, 4.0), Neighbor::new(1, 1.0), Neighbor::new(0, 0.0)];
        let cands = collect_candidates(&store, &knn, 0, full);
        let ids: Vec<u32> = cands.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }
}
