//! nsg: Navigable Sparse Graph approximate nearest neighbor search.
//!
//! Builds a sparse, degree-bounded, connected graph over a point set from a
//! precomputed approximate k-NN graph, then answers k-nearest-neighbor queries
//! by greedy best-first traversal from a fixed entry node (the medoid).
//!
//! - `build/`: construction (expansion, occlusion pruning, interlinking,
//!   connectivity repair)
//! - `optimize`: packed node records for cache-friendly search
//! - `search`: best-first traversal over either representation
//! - `persistence`: little-endian topology files
//! - `index`: the owning [`NsgIndex`] handle
//!
//! Distances are squared Euclidean throughout.
//!
//! # Critical Nuances
//!
//! ## Why prune by occlusion
//!
//! Keeping the `R` nearest neighbors of each node clusters edges in one
//! direction: on a line, every node links only to its neighbors on the denser
//! side. Occlusion pruning drops a candidate when an already kept neighbor is
//! closer to it than the node is, which spreads edges across directions and
//! keeps greedy search from stalling.
//!
//! ## Quality depends on the k-NN input
//!
//! Construction only ever considers nodes reachable through the k-NN graph
//! (plus the reverse edges it creates). A poor k-NN graph yields a poor NSG
//! regardless of `L`, `R` and `C`.
//!
//! ## Fixed entry point
//!
//! Every search starts at the medoid. Queries far from the data's center pay
//! for a longer walk; a larger search pool `L'` buys recall at that cost.
//!
//! # Example
//!
//! ```rust
//! use nsg::{BuildParams, KnnGraph, NsgIndex, SearchParams};
//!
//! # fn main() -> nsg::Result<()> {
//! let points: Vec<Vec<f32>> = (0..5).map(|i| vec![i as f32, 0.0]).collect();
//! let knn = KnnGraph::from_lists(
//!     (0..5u32).map(|i| (0..5u32).filter(|&j| j != i).collect()).collect(),
//! );
//!
//! let mut index = NsgIndex::new(2, 5)?;
//! index.build_with_knn(&points, &knn, &BuildParams::new(10, 2, 10))?;
//!
//! let hits = index.search(&[4.4, 0.0], &SearchParams::new(1, 10))?;
//! assert_eq!(hits[0].0, 4);
//! # Ok(())
//! # }
//! ```

pub mod build;
pub mod config;
pub mod error;
pub mod graph;
pub mod index;
pub mod knn;
pub mod medoid;
pub mod optimize;
pub mod persistence;
pub mod pool;
pub mod search;
pub mod simd;
pub mod store;

// Re-exports
pub use build::{BuildStats, GraphBuilder};
pub use config::{BuildParams, SearchParams};
pub use error::{NsgError, Result};
pub use graph::{DegreeStats, NavigableGraph, NeighborList, Topology};
pub use index::{NsgIndex, Phase};
pub use knn::KnnGraph;
pub use optimize::OptimizedLayout;
pub use search::{GraphView, StoreView};
pub use store::{align, VectorStore};
