//! Greedy best-first search over a navigable graph.
//!
//! The same traversal runs over the id-indexed graph with its vector store
//! and over the packed [`OptimizedLayout`]. Both expose neighbors and
//! distances through [`GraphView`], so for identical inputs they evaluate
//! the same nodes in the same order and return identical results.

use crate::config::SearchParams;
use crate::graph::NavigableGraph;
use crate::optimize::OptimizedLayout;
use crate::pool::{CandidatePool, VisitedSet};
use crate::store::VectorStore;

/// Read-only access to a graph and the vectors of its nodes.
pub trait GraphView: Sync {
    /// Number of nodes.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Node every traversal starts from.
    fn entry(&self) -> u32;

    /// Out-neighbors of `id`.
    fn neighbors(&self, id: u32) -> &[u32];

    /// Squared distance from an aligned query to node `id`.
    fn distance_to(&self, query: &[f32], id: u32) -> f32;
}

/// A [`NavigableGraph`] paired with the vectors it was built over.
#[derive(Clone, Copy, Debug)]
pub struct StoreView<'a> {
    pub graph: &'a NavigableGraph,
    pub store: &'a VectorStore,
}

impl GraphView for StoreView<'_> {
    #[inline]
    fn len(&self) -> usize {
        self.graph.len()
    }

    #[inline]
    fn entry(&self) -> u32 {
        self.graph.entry()
    }

    #[inline]
    fn neighbors(&self, id: u32) -> &[u32] {
        self.graph.neighbors(id)
    }

    #[inline]
    fn distance_to(&self, query: &[f32], id: u32) -> f32 {
        self.store.distance_to(query, id)
    }
}

impl GraphView for OptimizedLayout {
    #[inline]
    fn len(&self) -> usize {
        OptimizedLayout::len(self)
    }

    #[inline]
    fn entry(&self) -> u32 {
        OptimizedLayout::entry(self)
    }

    #[inline]
    fn neighbors(&self, id: u32) -> &[u32] {
        OptimizedLayout::neighbors(self, id)
    }

    #[inline]
    fn distance_to(&self, query: &[f32], id: u32) -> f32 {
        OptimizedLayout::distance_to(self, query, id)
    }
}

/// Find up to `params.k` approximate nearest neighbors of an aligned query.
///
/// Returns `(id, squared distance)` pairs in ascending distance order, ties
/// broken by lowest id. Fewer than `k` pairs come back when fewer nodes are
/// reachable within the pool.
pub fn search<V: GraphView + ?Sized>(view: &V, query: &[f32], params: &SearchParams) -> Vec<(u32, f32)> {
    let mut visited = VisitedSet::new(view.len());
    search_with(view, query, params, &mut visited)
}

/// [`search`] with a caller-provided visited set sized for `view`.
pub fn search_with<V: GraphView + ?Sized>(
    view: &V,
    query: &[f32],
    params: &SearchParams,
    visited: &mut VisitedSet,
) -> Vec<(u32, f32)> {
    let n = view.len();
    if n == 0 || params.k == 0 {
        return Vec::new();
    }

    visited.clear();
    let mut pool = CandidatePool::new(params.pool_size.max(params.k));
    let entry = view.entry();
    visited.insert(entry);
    pool.insert(entry, view.distance_to(query, entry));

    let mut expansions = 0;
    while expansions < n {
        let Some(current) = pool.next_unvisited() else {
            break;
        };
        expansions += 1;
        for &id in view.neighbors(current.id) {
            if visited.insert(id) {
                pool.insert(id, view.distance_to(query, id));
            }
        }
    }

    pool.top_k(params.k)
}
