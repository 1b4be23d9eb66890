//! Connectivity repair.
//!
//! Pruning guarantees sparsity, not reachability. This pass walks the graph
//! from the entry node and grafts every unreachable node onto the reached
//! component with a single edge `frontier -> orphan`, where `frontier` is
//! the closest reached node that still has room under the degree cap.
//!
//! The frontier is searched in two steps:
//!
//! 1. a beam search over the reached part of the graph, seeded with the entry
//!    node and the orphan's own reachable k-NN neighbors;
//! 2. if every node in that beam is already at full degree, an exhaustive
//!    scan over all reached nodes.
//!
//! When no reached node has room, the orphan is spliced in instead: the
//! closest reached node `p` trades its farthest edge `p -> q` for `p -> orphan`,
//! and the orphan takes `orphan -> q` (dropping its own farthest edge if it is
//! full). Every path through `p -> q` now runs through the orphan, so the
//! reached set only grows and no list exceeds the cap.
//!
//! Once attached, the traversal continues from the orphan, so one edge can
//! pull a whole unreachable subgraph into the component.

use crate::error::{NsgError, Result};
use crate::graph::NeighborList;
use crate::knn::KnnGraph;
use crate::pool::{CandidatePool, Neighbor, VisitedSet};
use crate::store::VectorStore;
use tracing::trace;

/// Outcome of a repair pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct RepairStats {
    /// Edges added to attach unreachable nodes.
    pub grafted: usize,
    /// Grafts that needed the exhaustive scan.
    pub fallback: usize,
    /// Grafts that replaced an edge of a full node.
    pub spliced: usize,
}

pub(crate) struct Repair<'a> {
    pub store: &'a VectorStore,
    pub knn: &'a KnnGraph,
    pub entry: u32,
    pub max_degree: usize,
    pub pool_size: usize,
}

impl Repair<'_> {
    /// Make every node reachable from the entry, mutating `lists` in place.
    pub fn run(&self, lists: &mut [NeighborList]) -> Result<RepairStats> {
        let n = lists.len();
        let mut stats = RepairStats::default();
        if n == 0 {
            return Ok(stats);
        }

        let mut reached = vec![false; n];
        let mut stack = Vec::new();
        let mut visited = VisitedSet::new(n);
        mark_reachable(lists, self.entry, &mut reached, &mut stack);

        let mut cursor = 0;
        loop {
            while cursor < n && reached[cursor] {
                cursor += 1;
            }
            if cursor == n {
                break;
            }
            let orphan = cursor as u32;

            let pool = self.beam(lists, &reached, orphan, &mut visited);
            let with_room = pool.as_slice().iter().find(|c| self.has_room(lists, c.id));
            if let Some(frontier) = with_room.map(|c| c.id) {
                insert_sorted(self.store, &mut lists[frontier as usize], frontier, orphan);
                trace!(frontier, orphan, "grafted unreachable node");
            } else if let Some(frontier) = self.scan_frontier(lists, &reached, orphan) {
                insert_sorted(self.store, &mut lists[frontier as usize], frontier, orphan);
                trace!(frontier, orphan, "grafted unreachable node after full scan");
                stats.fallback += 1;
            } else {
                let closest = pool.as_slice().first().map(|c| c.id);
                let frontier = closest.ok_or(NsgError::Disconnected { node: orphan })?;
                self.splice(lists, frontier, orphan)?;
                stats.spliced += 1;
            }
            stats.grafted += 1;

            mark_reachable(lists, orphan, &mut reached, &mut stack);
        }

        Ok(stats)
    }

    fn has_room(&self, lists: &[NeighborList], id: u32) -> bool {
        lists[id as usize].len() < self.max_degree
    }

    /// Beam search toward `orphan` restricted to reached nodes.
    fn beam(&self, lists: &[NeighborList], reached: &[bool], orphan: u32, visited: &mut VisitedSet) -> CandidatePool {
        visited.clear();
        let mut pool = CandidatePool::new(self.pool_size.max(1));

        let seeds = std::iter::once(self.entry).chain(self.knn.neighbors(orphan).iter().copied());
        for id in seeds {
            if id != orphan && reached[id as usize] && visited.insert(id) {
                pool.insert(id, self.store.distance(orphan, id));
            }
        }

        while let Some(current) = pool.next_unvisited() {
            for &id in lists[current.id as usize].iter() {
                if reached[id as usize] && visited.insert(id) {
                    pool.insert(id, self.store.distance(orphan, id));
                }
            }
        }
        pool
    }

    /// Closest reached node with spare degree, by exhaustive scan.
    fn scan_frontier(&self, lists: &[NeighborList], reached: &[bool], orphan: u32) -> Option<u32> {
        (0..lists.len() as u32)
            .filter(|&id| reached[id as usize] && self.has_room(lists, id))
            .map(|id| Neighbor::new(id, self.store.distance(orphan, id)))
            .min_by(|a, b| a.cmp_rank(b))
            .map(|c| c.id)
    }

    /// Route `frontier`'s farthest edge through `orphan`.
    fn splice(&self, lists: &mut [NeighborList], frontier: u32, orphan: u32) -> Result<()> {
        let evicted = lists[frontier as usize]
            .pop()
            .ok_or(NsgError::Disconnected { node: orphan })?;
        insert_sorted(self.store, &mut lists[frontier as usize], frontier, orphan);

        let own = &mut lists[orphan as usize];
        if !own.contains(&evicted) {
            if own.len() >= self.max_degree {
                own.pop();
            }
            insert_sorted(self.store, own, orphan, evicted);
        }
        trace!(frontier, orphan, evicted, "spliced unreachable node");
        Ok(())
    }
}

/// Depth-first marking of everything reachable from `start`.
fn mark_reachable(lists: &[NeighborList], start: u32, reached: &mut [bool], stack: &mut Vec<u32>) {
    reached[start as usize] = true;
    stack.push(start);
    while let Some(node) = stack.pop() {
        for &next in lists[node as usize].iter() {
            if !reached[next as usize] {
                reached[next as usize] = true;
                stack.push(next);
            }
        }
    }
}

/// Insert `id` into `list` keeping `(distance from owner, id)` order.
fn insert_sorted(store: &VectorStore, list: &mut NeighborList, owner: u32, id: u32) {
    let new = Neighbor::new(id, store.distance(owner, id));
    let pos = list.partition_point(|&x| {
        Neighbor::new(x, store.distance(owner, x))
            .cmp_rank(&new)
            .is_lt()
    });
    list.insert(pos, id);
}
