//! Candidate expansion over the k-NN graph.

use crate::knn::KnnGraph;
use crate::pool::{CandidatePool, Neighbor, VisitedSet};
use crate::store::VectorStore;

/// Greedy best-first walk of the k-NN graph toward one target node.
pub(crate) struct Expansion<'a> {
    pub store: &'a VectorStore,
    pub knn: &'a KnnGraph,
    pub entry: u32,
    pub pool_size: usize,
}

impl Expansion<'_> {
    /// Walk from the entry toward `target` and return every node whose
    /// distance to `target` was evaluated (the full set), in evaluation order.
    ///
    /// The pool starts from the entry and its k-NN list. At each step the
    /// closest unexpanded pool member contributes its k-NN list. The walk
    /// ends when every pool member has been expanded.
    pub fn expand(&self, target: u32, visited: &mut VisitedSet) -> Vec<Neighbor> {
        visited.clear();

        let mut pool = CandidatePool::new(self.pool_size);
        let mut full = Vec::with_capacity(self.pool_size * 2);

        let seeds = std::iter::once(self.entry).chain(self.knn.neighbors(self.entry).iter().copied());
        for id in seeds {
            if visited.insert(id) {
                let distance = self.store.distance(target, id);
                full.push(Neighbor::new(id, distance));
                pool.insert(id, distance);
            }
        }

        while let Some(current) = pool.next_unvisited() {
            for &id in self.knn.neighbors(current.id) {
                if !visited.insert(id) {
                    continue;
                }
                let distance = self.store.distance(target, id);
                full.push(Neighbor::new(id, distance));
                pool.insert(id, distance);
            }
        }

        full
    }
}
