//! NSG construction from an approximate k-NN graph.
//!
//! # Algorithm
//!
//! 1. **Entry**: the medoid (point nearest the centroid).
//! 2. **Expansion**: for every node `v`, a best-first walk of the k-NN graph
//!    from the entry with a pool of size `L` collects candidates near `v`.
//! 3. **Pruning**: candidates (plus `v`'s own k-NN list) are ranked by
//!    distance; the first `C` are filtered with the occlusion rule down to
//!    at most `R` neighbors.
//! 4. **Interlinking**: every node also considers the nodes that chose it,
//!    re-pruning when the union exceeds `R`.
//! 5. **Repair**: a traversal from the entry grafts any unreachable node onto
//!    the closest reachable node with spare degree, or splices it into the
//!    closest reachable node's farthest edge when no such node exists.
//!
//! Steps 2–4 run in parallel over nodes; each task writes only its own
//! neighbor list. Step 5 is a single serial pass.
//!
//! # Example
//!
//! ```rust
//! use nsg::{BuildParams, GraphBuilder, KnnGraph, VectorStore};
//!
//! # fn main() -> nsg::Result<()> {
//! let points: Vec<Vec<f32>> = (0..5).map(|i| vec![i as f32, 0.0]).collect();
//! let store = VectorStore::from_rows(&points, 2)?;
//! let knn = KnnGraph::from_lists(
//!     (0..5u32).map(|i| (0..5u32).filter(|&j| j != i).collect()).collect(),
//! );
//!
//! let params = BuildParams::new(10, 2, 10);
//! let (graph, stats) = GraphBuilder::new(&store, &knn, &params)?.build()?;
//! assert!(graph.is_connected());
//! assert!(stats.degree.max <= 2);
//! # Ok(())
//! # }
//! ```
//!
//! # References
//!
//! - Fu, Xiang, Wang, Cai (2019): "Fast Approximate Nearest Neighbor Search
//!   With The Navigating Spreading-out Graph", VLDB.

mod expand;
mod interlink;
mod prune;
mod repair;

use crate::config::BuildParams;
use crate::error::{NsgError, Result};
use crate::graph::{DegreeStats, NavigableGraph, NeighborList};
use crate::knn::KnnGraph;
use crate::medoid::select_medoid;
use crate::pool::VisitedSet;
use crate::store::VectorStore;
use expand::Expansion;
use rayon::prelude::*;
use repair::Repair;
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Summary of a finished build.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BuildStats {
    pub nodes: usize,
    pub edges: usize,
    pub entry: u32,
    pub degree: DegreeStats,
    /// Edges added by connectivity repair.
    pub grafted: usize,
    /// Grafts whose frontier needed an exhaustive scan.
    pub fallback_grafts: usize,
    /// Grafts that rerouted an edge of a node already at the degree cap.
    pub spliced_grafts: usize,
}

/// Builds a [`NavigableGraph`] from a point set and its k-NN graph.
#[derive(Debug)]
pub struct GraphBuilder<'a> {
    store: &'a VectorStore,
    knn: &'a KnnGraph,
    pool_size: usize,
    max_degree: usize,
    max_candidates: usize,
}

impl<'a> GraphBuilder<'a> {
    /// Validate inputs. Nothing is computed until [`GraphBuilder::build`].
    pub fn new(store: &'a VectorStore, knn: &'a KnnGraph, params: &BuildParams) -> Result<Self> {
        params.validate()?;
        if store.is_empty() {
            return Err(NsgError::InvalidInput(
                "cannot build a graph over an empty point set".to_string(),
            ));
        }
        if store.len() > u32::MAX as usize {
            return Err(NsgError::InvalidInput(format!(
                "{} points exceed the u32 id space",
                store.len()
            )));
        }
        knn.validate(store.len())?;

        Ok(Self {
            store,
            knn,
            pool_size: params.pool_size,
            max_degree: params.max_degree,
            max_candidates: params.max_candidates,
        })
    }

    /// Run construction.
    pub fn build(&self) -> Result<(NavigableGraph, BuildStats)> {
        let started = Instant::now();
        let n = self.store.len();
        info!(
            nodes = n,
            dim = self.store.dimension(),
            l = self.pool_size,
            r = self.max_degree,
            c = self.max_candidates,
            "building NSG"
        );

        let entry = select_medoid(self.store)?;
        debug!(entry, "selected medoid");

        let pruned = self.prune_all(entry);
        debug!(
            edges = pruned.iter().map(|l| l.len()).sum::<usize>(),
            "per-node pruning done"
        );

        let mut lists = interlink::interlink(self.store, &pruned, self.max_degree);
        drop(pruned);
        debug!(
            edges = lists.iter().map(|l| l.len()).sum::<usize>(),
            "reverse-edge interlinking done"
        );

        let repair = Repair {
            store: self.store,
            knn: self.knn,
            entry,
            max_degree: self.max_degree,
            pool_size: self.pool_size,
        };
        let repaired = repair.run(&mut lists)?;
        if repaired.grafted > 0 {
            warn!(
                grafted = repaired.grafted,
                fallback = repaired.fallback,
                spliced = repaired.spliced,
                "connectivity repair attached unreachable nodes"
            );
        }

        let graph = NavigableGraph::from_parts(lists, self.max_degree, entry);
        let stats = BuildStats {
            nodes: n,
            edges: graph.num_edges(),
            entry,
            degree: graph.degree_stats(),
            grafted: repaired.grafted,
            fallback_grafts: repaired.fallback,
            spliced_grafts: repaired.spliced,
        };

        info!(
            edges = stats.edges,
            max_degree = stats.degree.max,
            avg_degree = stats.degree.avg,
            grafted = stats.grafted,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "NSG build complete"
        );

        Ok((graph, stats))
    }

    /// Expansion and pruning for every node. Tasks share only read-only
    /// inputs; each one produces exactly one list.
    fn prune_all(&self, entry: u32) -> Vec<NeighborList> {
        let n = self.store.len();
        let expansion = Expansion {
            store: self.store,
            knn: self.knn,
            entry,
            pool_size: self.pool_size,
        };

        (0..n as u32)
            .into_par_iter()
            .map_init(
                || VisitedSet::new(n),
                |visited, node| {
                    let full = expansion.expand(node, visited);
                    let candidates = prune::collect_candidates(self.store, self.knn, node, full);
                    prune::occlusion_prune(
                        self.store,
                        node,
                        &candidates,
                        self.max_degree,
                        self.max_candidates,
                    )
                },
            )
            .collect()
    }
}
