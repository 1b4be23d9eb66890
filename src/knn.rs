//! External approximate k-NN graph, the input to graph construction.
//!
//! # File format
//!
//! One record per node, in id order, all integers little-endian `u32`:
//!
//! ```text
//! ┌──────────┬───────────────────────┐
//! │ k        │ ids[k]                │   node 0
//! ├──────────┼───────────────────────┤
//! │ k        │ ids[k]                │   node 1
//! └──────────┴───────────────────────┘   ...
//! ```
//!
//! `k` is normally the same for every record, but the reader accepts
//! per-record counts. The node count is implied by the number of records.

use crate::error::{NsgError, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Approximate nearest-neighbor lists, one per node.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KnnGraph {
    lists: Vec<Vec<u32>>,
}

impl KnnGraph {
    /// Wrap in-memory neighbor lists. Ids are checked by [`KnnGraph::validate`].
    pub fn from_lists(lists: Vec<Vec<u32>>) -> Self {
        Self { lists }
    }

    /// Read a k-NN graph file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::from_bytes(&bytes)
    }

    /// Parse the on-disk record format from memory.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() % 4 != 0 {
            return Err(NsgError::CorruptData(format!(
                "k-NN graph length {} is not a multiple of 4 bytes",
                bytes.len()
            )));
        }

        let mut words = bytes
            .chunks_exact(4)
            .map(|w| u32::from_le_bytes([w[0], w[1], w[2], w[3]]));
        let mut lists = Vec::new();

        while let Some(k) = words.next() {
            let mut list = Vec::with_capacity((k as usize).min(words.len()));
            for _ in 0..k {
                let id = words.next().ok_or_else(|| {
                    NsgError::CorruptData(format!(
                        "k-NN record for node {} truncated: expected {k} ids, got {}",
                        lists.len(),
                        list.len()
                    ))
                })?;
                list.push(id);
            }
            lists.push(list);
        }

        Ok(Self { lists })
    }

    /// Write the graph in the on-disk record format.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path.as_ref())?);
        for list in &self.lists {
            writer.write_all(&(list.len() as u32).to_le_bytes())?;
            for &id in list {
                writer.write_all(&id.to_le_bytes())?;
            }
        }
        writer.flush()?;
        Ok(())
    }

    /// Check that the graph covers exactly `n` nodes and every id is in range.
    pub fn validate(&self, n: usize) -> Result<()> {
        if self.lists.len() != n {
            return Err(NsgError::InvalidInput(format!(
                "k-NN graph has {} nodes but the point set has {n}",
                self.lists.len()
            )));
        }
        for (node, list) in self.lists.iter().enumerate() {
            if let Some(&bad) = list.iter().find(|&&id| id as usize >= n) {
                return Err(NsgError::InvalidInput(format!(
                    "k-NN list of node {node} references id {bad}, outside [0, {n})"
                )));
            }
        }
        Ok(())
    }

    /// Candidate neighbors of `id`, in the order supplied.
    #[inline]
    pub fn neighbors(&self, id: u32) -> &[u32] {
        &self.lists[id as usize]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.lists.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }
}
