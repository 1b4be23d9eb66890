//! Error types for nsg.

use thiserror::Error;

/// Errors that can occur while building, persisting, or searching an index.
#[derive(Debug, Error)]
pub enum NsgError {
    /// Malformed caller input (ragged point rows, out-of-range ids, count mismatch).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Vector length does not match the configured dimension.
    #[error("dimension mismatch: expected {expected} dimensions, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Invalid parameter value (non-positive L/R/C, k > pool size).
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// I/O error (unreadable k-NN graph, unreadable/unwritable graph file)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Truncated or inconsistent data on disk.
    #[error("corrupt data: {0}")]
    CorruptData(String),

    /// Connectivity repair could not attach a node to the entry component.
    #[error("build failed: node {node} cannot be connected to the entry component")]
    Disconnected { node: u32 },

    /// Operation not allowed in the index's current phase.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Malformed configuration document.
    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

impl NsgError {
    /// True for errors caused by caller-supplied values rather than the environment.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            NsgError::InvalidInput(_)
                | NsgError::DimensionMismatch { .. }
                | NsgError::InvalidParameter(_)
                | NsgError::Config(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, NsgError>;
