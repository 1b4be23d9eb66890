//! Search-optimized packing of graph and vectors.
//!
//! Every node gets one fixed-size record of `u32` words, so a single
//! expansion touches one contiguous region instead of a neighbor list on the
//! heap plus a row in the vector store:
//!
//! ```text
//! stride = 1 + R + aligned_dim words
//! ┌───────┬──────────────────────────────┬──────────────────────────┐
//! │ count │ ids[R]  (unused slots = 0)   │ vector bits[aligned_dim] │  node 0
//! ├───────┼──────────────────────────────┼──────────────────────────┤
//! │ count │ ids[R]                       │ vector bits              │  node 1
//! └───────┴──────────────────────────────┴──────────────────────────┘  ...
//! ```
//!
//! Vector words hold `f32::to_bits`, read back through `bytemuck` casts.

use crate::error::{NsgError, Result};
use crate::graph::NavigableGraph;
use crate::simd;
use crate::store::VectorStore;
use rayon::prelude::*;
use tracing::debug;

/// Immutable flat layout derived from a built graph and its vectors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptimizedLayout {
    words: Vec<u32>,
    stride: usize,
    max_degree: usize,
    aligned_dimension: usize,
    len: usize,
    entry: u32,
}

impl OptimizedLayout {
    /// Pack `graph` and `store` into one record per node.
    ///
    /// Pure: topology is unchanged and identical inputs give a byte-identical
    /// layout.
    pub fn new(graph: &NavigableGraph, store: &VectorStore) -> Result<Self> {
        if graph.len() != store.len() {
            return Err(NsgError::InvalidInput(format!(
                "graph has {} nodes but the store holds {} points",
                graph.len(),
                store.len()
            )));
        }

        let max_degree = graph.max_degree();
        let aligned_dimension = store.aligned_dimension();
        let stride = 1 + max_degree + aligned_dimension;
        let mut words = vec![0u32; graph.len() * stride];

        words
            .par_chunks_mut(stride)
            .enumerate()
            .for_each(|(id, record)| {
                let id = id as u32;
                let list = graph.neighbors(id);
                let (head, vector) = record.split_at_mut(1 + max_degree);
                head[0] = list.len() as u32;
                head[1..1 + list.len()].copy_from_slice(list);
                vector.copy_from_slice(bytemuck::cast_slice(store.vector(id)));
            });

        let layout = Self {
            words,
            stride,
            max_degree,
            aligned_dimension,
            len: graph.len(),
            entry: graph.entry(),
        };
        debug!(
            nodes = layout.len,
            stride,
            bytes = layout.size_bytes(),
            "built optimized layout"
        );
        Ok(layout)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn entry(&self) -> u32 {
        self.entry
    }

    #[inline]
    pub fn max_degree(&self) -> usize {
        self.max_degree
    }

    #[inline]
    pub fn aligned_dimension(&self) -> usize {
        self.aligned_dimension
    }

    /// Words per node record.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    #[inline]
    fn record(&self, id: u32) -> &[u32] {
        let start = id as usize * self.stride;
        &self.words[start..start + self.stride]
    }

    /// Neighbor ids of `id`, nearest first.
    #[inline]
    pub fn neighbors(&self, id: u32) -> &[u32] {
        let record = self.record(id);
        let count = (record[0] as usize).min(self.max_degree);
        &record[1..1 + count]
    }

    /// Aligned vector of `id`.
    #[inline]
    pub fn vector(&self, id: u32) -> &[f32] {
        bytemuck::cast_slice(&self.record(id)[1 + self.max_degree..])
    }

    /// Squared distance from an aligned query to `id`.
    #[inline]
    pub fn distance_to(&self, query: &[f32], id: u32) -> f32 {
        simd::l2_distance_squared(query, self.vector(id))
    }

    /// Raw little-endian-in-memory bytes of the whole layout.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.words)
    }

    pub fn size_bytes(&self) -> usize {
        self.words.len() * std::mem::size_of::<u32>()
    }
}
