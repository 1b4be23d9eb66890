//! On-disk graph topology.
//!
//! Only neighbor lists are stored; vectors are supplied again at load time
//! and the entry node is recomputed from them.
//!
//! # Format
//!
//! All integers are little-endian `u32`:
//!
//! ```text
//! ┌────────────┬────────────┐
//! │ max_degree │ node_count │   header
//! ├────────────┼────────────┴──────────────────┐
//! │ count      │ ids[count]                    │   node 0
//! ├────────────┼───────────────────────────────┤
//! │ count      │ ids[count]                    │   node 1
//! └────────────┴───────────────────────────────┘   ...
//! ```
//!
//! The file must end exactly after the last record.

use crate::error::{NsgError, Result};
use crate::graph::{NavigableGraph, NeighborList, Topology};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Serialize a topology to any writer.
pub fn write_topology<W: Write>(topology: &Topology, writer: &mut W) -> Result<()> {
    let max_degree = to_word(topology.max_degree, "max degree")?;
    let node_count = to_word(topology.lists.len(), "node count")?;
    writer.write_all(&max_degree.to_le_bytes())?;
    writer.write_all(&node_count.to_le_bytes())?;

    for list in &topology.lists {
        writer.write_all(&(list.len() as u32).to_le_bytes())?;
        for &id in list {
            writer.write_all(&id.to_le_bytes())?;
        }
    }
    Ok(())
}

fn to_word(value: usize, what: &str) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| NsgError::InvalidInput(format!("{what} {value} does not fit in u32")))
}

/// Write `graph`'s topology to `path`, replacing any existing file.
pub fn save(graph: &NavigableGraph, path: impl AsRef<Path>) -> Result<()> {
    save_topology(&graph.to_topology(), path)
}

/// Write a topology to `path`, replacing any existing file.
pub fn save_topology(topology: &Topology, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    write_topology(topology, &mut writer)?;
    writer.flush()?;
    info!(
        path = %path.display(),
        nodes = topology.len(),
        edges = topology.lists.iter().map(|l| l.len()).sum::<usize>(),
        "saved graph"
    );
    Ok(())
}

/// Parse a serialized topology, checking it against `expected_nodes`.
pub fn read_topology(bytes: &[u8], expected_nodes: usize) -> Result<Topology> {
    let mut reader = WordReader { bytes, pos: 0 };

    let max_degree = reader.next("header")? as usize;
    let node_count = reader.next("header")? as usize;
    if node_count != expected_nodes {
        return Err(NsgError::CorruptData(format!(
            "file holds {node_count} nodes, index is configured for {expected_nodes}"
        )));
    }

    let mut lists = Vec::with_capacity(node_count.min(reader.remaining()));
    for node in 0..node_count {
        let count = reader.next("neighbor count")? as usize;
        if count > max_degree {
            return Err(NsgError::CorruptData(format!(
                "node {node} lists {count} neighbors, above max degree {max_degree}"
            )));
        }
        let mut list = NeighborList::with_capacity(count);
        for _ in 0..count {
            let id = reader.next("neighbor id")?;
            if id as usize >= node_count {
                return Err(NsgError::CorruptData(format!(
                    "node {node} lists neighbor {id}, outside {node_count} nodes"
                )));
            }
            list.push(id);
        }
        lists.push(list);
    }

    if reader.remaining() != 0 {
        return Err(NsgError::CorruptData(format!(
            "{} trailing bytes after the last node",
            reader.remaining()
        )));
    }

    Ok(Topology { max_degree, lists })
}

/// Read the topology stored at `path`.
pub fn load(path: impl AsRef<Path>, expected_nodes: usize) -> Result<Topology> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let topology = read_topology(&bytes, expected_nodes)?;
    info!(path = %path.display(), nodes = topology.len(), "loaded graph");
    Ok(topology)
}

struct WordReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl WordReader<'_> {
    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn next(&mut self, what: &str) -> Result<u32> {
        let word = self
            .bytes
            .get(self.pos..self.pos + 4)
            .ok_or_else(|| NsgError::CorruptData(format!("truncated {what} at byte {}", self.pos)))?;
        self.pos += 4;
        Ok(u32::from_le_bytes([word[0], word[1], word[2], word[3]]))
    }
}
