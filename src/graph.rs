//! Navigable graph: a dense, id-indexed adjacency table with a fixed entry.

use crate::error::{NsgError, Result};
use serde::Serialize;
use smallvec::SmallVec;
use std::collections::VecDeque;

/// Out-neighbors of one node, nearest first.
///
/// Inline capacity covers the common `R <= 32` case without a heap allocation.
pub type NeighborList = SmallVec<[u32; 32]>;

/// Graph structure without an entry point, as stored on disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Topology {
    pub max_degree: usize,
    pub lists: Vec<NeighborList>,
}

impl Topology {
    #[inline]
    pub fn len(&self) -> usize {
        self.lists.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }
}

/// Degree-bounded directed graph over point ids with a designated entry node.
///
/// Invariants, established by the builder and checked on load:
/// - no self-loops, no duplicate ids in a list
/// - every list has at most `max_degree` entries
/// - every node is reachable from `entry`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavigableGraph {
    lists: Vec<NeighborList>,
    max_degree: usize,
    entry: u32,
}

impl NavigableGraph {
    pub(crate) fn from_parts(lists: Vec<NeighborList>, max_degree: usize, entry: u32) -> Self {
        Self {
            lists,
            max_degree,
            entry,
        }
    }

    /// Attach an entry point to restored topology.
    ///
    /// Checks the entry id and the structural invariants that do not need
    /// vectors (degree bound, id range, self-loops, duplicates).
    pub fn from_topology(topology: Topology, entry: u32) -> Result<Self> {
        let n = topology.lists.len();
        if entry as usize >= n {
            return Err(NsgError::InvalidInput(format!(
                "entry {entry} outside graph of {n} nodes"
            )));
        }
        for (node, list) in topology.lists.iter().enumerate() {
            if list.len() > topology.max_degree {
                return Err(NsgError::CorruptData(format!(
                    "node {node} has {} neighbors, above max degree {}",
                    list.len(),
                    topology.max_degree
                )));
            }
            for (i, &id) in list.iter().enumerate() {
                if id as usize >= n || id as usize == node || list[..i].contains(&id) {
                    return Err(NsgError::CorruptData(format!(
                        "node {node} has invalid neighbor {id}"
                    )));
                }
            }
        }
        Ok(Self {
            lists: topology.lists,
            max_degree: topology.max_degree,
            entry,
        })
    }

    /// Drop the entry point, keeping what is persisted.
    pub fn to_topology(&self) -> Topology {
        Topology {
            max_degree: self.max_degree,
            lists: self.lists.clone(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.lists.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    /// Entry node (the medoid) used by every traversal.
    #[inline]
    pub fn entry(&self) -> u32 {
        self.entry
    }

    /// Degree cap `R`.
    #[inline]
    pub fn max_degree(&self) -> usize {
        self.max_degree
    }

    #[inline]
    pub fn neighbors(&self, id: u32) -> &[u32] {
        &self.lists[id as usize]
    }

    pub fn lists(&self) -> &[NeighborList] {
        &self.lists
    }

    /// Total number of directed edges.
    pub fn num_edges(&self) -> usize {
        self.lists.iter().map(|l| l.len()).sum()
    }

    /// Breadth-first reachability from the entry node.
    pub fn reachable_from_entry(&self) -> Vec<bool> {
        let mut seen = vec![false; self.lists.len()];
        if self.lists.is_empty() {
            return seen;
        }
        let mut queue = VecDeque::from([self.entry]);
        seen[self.entry as usize] = true;
        while let Some(node) = queue.pop_front() {
            for &next in self.neighbors(node) {
                if !seen[next as usize] {
                    seen[next as usize] = true;
                    queue.push_back(next);
                }
            }
        }
        seen
    }

    /// True when every node is reachable from the entry node.
    pub fn is_connected(&self) -> bool {
        self.reachable_from_entry().into_iter().all(|r| r)
    }

    /// Degree statistics.
    pub fn degree_stats(&self) -> DegreeStats {
        let degrees = self.lists.iter().map(|l| l.len());
        let min = degrees.clone().min().unwrap_or(0);
        let max = degrees.max().unwrap_or(0);
        let avg = if self.lists.is_empty() {
            0.0
        } else {
            self.num_edges() as f64 / self.lists.len() as f64
        };
        DegreeStats { min, max, avg }
    }

    /// Approximate heap footprint of the adjacency table.
    pub fn size_bytes(&self) -> usize {
        self.lists.len() * std::mem::size_of::<NeighborList>()
            + self
                .lists
                .iter()
                .filter(|l| l.spilled())
                .map(|l| l.capacity() * std::mem::size_of::<u32>())
                .sum::<usize>()
    }
}

/// Out-degree summary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct DegreeStats {
    pub min: usize,
    pub max: usize,
    pub avg: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    fn chain() -> NavigableGraph {
        NavigableGraph::from_parts(vec![smallvec![1], smallvec![2], smallvec![]], 2, 0)
    }

    #[test]
    fn reachability_follows_directed_edges() {
        let g = chain();
        assert!(g.is_connected());

        let from_middle = NavigableGraph::from_parts(g.lists.clone(), 2, 1);
        assert_eq!(from_middle.reachable_from_entry(), vec![false, true, true]);
        assert!(!from_middle.is_connected());
    }

    #[test]
    fn degree_stats() {
        let stats = chain().degree_stats();
        assert_eq!(stats.min, 0);
        assert_eq!(stats.max, 1);
        assert!((stats.avg - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn topology_round_trip() {
        let g = chain();
        let restored = NavigableGraph::from_topology(g.to_topology(), 0).unwrap();
        assert_eq!(restored, g);
    }

    #[test]
    fn from_topology_rejects_self_loops_and_overflow() {
        let looped = Topology {
            max_degree: 2,
            lists: vec![smallvec![0], smallvec![]],
        };
        assert!(NavigableGraph::from_topology(looped, 0).is_err());

        let wide = Topology {
            max_degree: 1,
            lists: vec![smallvec![1, 2], smallvec![], smallvec![]],
        };
        assert!(NavigableGraph::from_topology(wide, 0).is_err());

        let dup = Topology {
            max_degree: 3,
            lists: vec![smallvec![1, 1], smallvec![]],
        };
        assert!(NavigableGraph::from_topology(dup, 0).is_err());
    }

    #[test]
    fn from_topology_rejects_bad_entry() {
        let t = Topology {
            max_degree: 1,
            lists: vec![smallvec![]],
        };
        assert!(matches!(
            NavigableGraph::from_topology(t, 3),
            Err(NsgError::InvalidInput(_))
        ));
    }
}
