//! Build and search configuration.
//!
//! Both records deserialize from JSON. Field aliases accept the parameter
//! names used by the reference NSG tooling (`L`, `R`, `C`, `nn_graph_path`,
//! `L_search`), so existing parameter files load unchanged.

use crate::error::{NsgError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default candidate pool size during construction (`L`).
pub const DEFAULT_BUILD_POOL_SIZE: usize = 100;

/// Default maximum out-degree (`R`).
pub const DEFAULT_MAX_DEGREE: usize = 32;

/// Default number of candidates considered while pruning (`C`).
pub const DEFAULT_MAX_CANDIDATES: usize = 500;

/// Default number of results returned by a search.
pub const DEFAULT_K: usize = 10;

/// Default candidate pool size during search (`L'`).
pub const DEFAULT_SEARCH_POOL_SIZE: usize = 100;

/// Graph construction parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildParams {
    /// Candidate pool size for per-node expansion (`L`).
    #[serde(alias = "L")]
    pub pool_size: usize,

    /// Maximum out-degree of the final graph (`R`).
    #[serde(alias = "R")]
    pub max_degree: usize,

    /// Candidates examined by occlusion pruning (`C`).
    #[serde(alias = "C")]
    pub max_candidates: usize,

    /// Location of the external k-NN graph file.
    #[serde(alias = "nn_graph_path", default)]
    pub knn_graph_path: PathBuf,
}

impl Default for BuildParams {
    fn default() -> Self {
        Self {
            pool_size: DEFAULT_BUILD_POOL_SIZE,
            max_degree: DEFAULT_MAX_DEGREE,
            max_candidates: DEFAULT_MAX_CANDIDATES,
            knn_graph_path: PathBuf::new(),
        }
    }
}

impl BuildParams {
    pub fn new(pool_size: usize, max_degree: usize, max_candidates: usize) -> Self {
        Self {
            pool_size,
            max_degree,
            max_candidates,
            knn_graph_path: PathBuf::new(),
        }
    }

    /// Set the k-NN graph location.
    pub fn with_knn_graph_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.knn_graph_path = path.into();
        self
    }

    /// Reject non-positive `L`, `R` or `C`.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("L (pool_size)", self.pool_size),
            ("R (max_degree)", self.max_degree),
            ("C (max_candidates)", self.max_candidates),
        ] {
            if value == 0 {
                return Err(NsgError::InvalidParameter(format!("{name} must be > 0")));
            }
        }
        if self.max_degree > u32::MAX as usize {
            return Err(NsgError::InvalidParameter(format!(
                "R (max_degree) {} does not fit the on-disk u32 header",
                self.max_degree
            )));
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let params: Self = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }
}

/// Query parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchParams {
    /// Number of results.
    pub k: usize,

    /// Candidate pool size (`L'`), at least `k`.
    #[serde(alias = "L_search")]
    pub pool_size: usize,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            k: DEFAULT_K,
            pool_size: DEFAULT_SEARCH_POOL_SIZE,
        }
    }
}

impl SearchParams {
    pub fn new(k: usize, pool_size: usize) -> Self {
        Self { k, pool_size }
    }

    /// Reject `k == 0` and `k > pool_size`.
    pub fn validate(&self) -> Result<()> {
        if self.k == 0 {
            return Err(NsgError::InvalidParameter("k must be > 0".to_string()));
        }
        if self.pool_size < self.k {
            return Err(NsgError::InvalidParameter(format!(
                "search pool size {} is smaller than k = {}",
                self.pool_size, self.k
            )));
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let params: Self = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }
}
