//! Owning index handle.
//!
//! [`NsgIndex`] owns the vector store, the navigable graph and the optimized
//! layout, and moves between phases:
//!
//! ```text
//!            build / build_with_knn                optimize
//! Unbuilt ───────────────────────────► Built ─────────────────► Optimized
//!    │                                  ▲ ▲                        │
//!    │ load (no vectors)                │ │ load / build           │
//!    ▼            attach_vectors        │ └────────────────────────┘
//! Loaded ───────────────────────────────┘
//! ```
//!
//! Every transition assembles the new state in locals and swaps it in only
//! on success, so a failed call leaves the index as it was.

use crate::build::{BuildStats, GraphBuilder};
use crate::config::{BuildParams, SearchParams};
use crate::error::{NsgError, Result};
use crate::graph::{NavigableGraph, Topology};
use crate::knn::KnnGraph;
use crate::medoid::select_medoid;
use crate::optimize::OptimizedLayout;
use crate::persistence;
use crate::pool::VisitedSet;
use crate::search::{self, GraphView, StoreView};
use crate::store::VectorStore;
use rayon::prelude::*;
use std::path::Path;

/// Lifecycle phase of an [`NsgIndex`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Nothing built or loaded yet.
    Unbuilt,
    /// Topology restored from disk, vectors not attached.
    Loaded,
    /// Graph and vectors present; generic search available.
    Built,
    /// Optimized layout present as well.
    Optimized,
}

#[derive(Debug)]
enum State {
    Unbuilt,
    Loaded(Topology),
    Built {
        store: VectorStore,
        graph: NavigableGraph,
    },
    Optimized {
        store: VectorStore,
        graph: NavigableGraph,
        layout: OptimizedLayout,
    },
}

/// NSG index over a fixed number of points of a fixed dimension.
///
/// # Example
///
/// ```rust
/// use nsg::{BuildParams, KnnGraph, NsgIndex, SearchParams};
///
/// # fn main() -> nsg::Result<()> {
/// let points: Vec<Vec<f32>> = (0..5).map(|i| vec![i as f32]).collect();
/// let knn = KnnGraph::from_lists(
///     (0..5u32).map(|i| (0..5u32).filter(|&j| j != i).collect()).collect(),
/// );
///
/// let mut index = NsgIndex::new(1, 5)?;
/// index.build_with_knn(&points, &knn, &BuildParams::new(10, 2, 10))?;
/// index.optimize()?;
///
/// let hits = index.search_optimized(&[4.4], &SearchParams::new(1, 4))?;
/// assert_eq!(hits[0].0, 4);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct NsgIndex {
    dimension: usize,
    num_points: usize,
    /// Vectors attached while still Unbuilt, kept so `load` can go straight
    /// to Built.
    pending: Option<VectorStore>,
    state: State,
    last_build: Option<BuildStats>,
}

impl NsgIndex {
    /// Create an empty index for `num_points` vectors of `dimension` floats.
    pub fn new(dimension: usize, num_points: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(NsgError::InvalidInput("dimension must be positive".to_string()));
        }
        if num_points > u32::MAX as usize {
            return Err(NsgError::InvalidInput(format!(
                "{num_points} points exceed the u32 id space"
            )));
        }
        Ok(Self {
            dimension,
            num_points,
            pending: None,
            state: State::Unbuilt,
            last_build: None,
        })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn num_points(&self) -> usize {
        self.num_points
    }

    pub fn phase(&self) -> Phase {
        phase_of(&self.state)
    }

    /// Statistics of the most recent successful build, if any.
    pub fn build_stats(&self) -> Option<&BuildStats> {
        self.last_build.as_ref()
    }

    /// The navigable graph, once built or attached to vectors.
    pub fn graph(&self) -> Option<&NavigableGraph> {
        match &self.state {
            State::Built { graph, .. } | State::Optimized { graph, .. } => Some(graph),
            State::Unbuilt | State::Loaded(_) => None,
        }
    }

    /// The optimized layout, once [`NsgIndex::optimize`] has run.
    pub fn layout(&self) -> Option<&OptimizedLayout> {
        match &self.state {
            State::Optimized { layout, .. } => Some(layout),
            _ => None,
        }
    }

    fn store(&self) -> Option<&VectorStore> {
        match &self.state {
            State::Built { store, .. } | State::Optimized { store, .. } => Some(store),
            State::Unbuilt | State::Loaded(_) => self.pending.as_ref(),
        }
    }

    /// Copy and align `points`, checking count and dimension.
    fn ingest<R: AsRef<[f32]>>(&self, points: &[R]) -> Result<VectorStore> {
        if points.len() != self.num_points {
            return Err(NsgError::InvalidInput(format!(
                "got {} points, index is configured for {}",
                points.len(),
                self.num_points
            )));
        }
        if let Some(row) = points.iter().find(|r| r.as_ref().len() != self.dimension) {
            return Err(NsgError::DimensionMismatch {
                expected: self.dimension,
                actual: row.as_ref().len(),
            });
        }
        VectorStore::from_rows(points, self.dimension)
    }

    /// Build from `points`, reading the k-NN graph from
    /// `params.knn_graph_path`.
    pub fn build<R: AsRef<[f32]>>(&mut self, points: &[R], params: &BuildParams) -> Result<BuildStats> {
        params.validate()?;
        let knn = KnnGraph::load(&params.knn_graph_path)?;
        self.build_with_knn(points, &knn, params)
    }

    /// Build from `points` and an in-memory k-NN graph.
    ///
    /// Rebuilding replaces any previous graph and layout.
    pub fn build_with_knn<R: AsRef<[f32]>>(
        &mut self,
        points: &[R],
        knn: &KnnGraph,
        params: &BuildParams,
    ) -> Result<BuildStats> {
        let store = self.ingest(points)?;
        if knn.len() != self.num_points {
            return Err(NsgError::InvalidInput(format!(
                "k-NN graph has {} lists, index is configured for {} points",
                knn.len(),
                self.num_points
            )));
        }

        let (graph, stats) = GraphBuilder::new(&store, knn, params)?.build()?;

        self.pending = None;
        self.state = State::Built { store, graph };
        self.last_build = Some(stats.clone());
        Ok(stats)
    }

    /// Pack graph and vectors for faster search. Idempotent.
    pub fn optimize(&mut self) -> Result<()> {
        let state = std::mem::replace(&mut self.state, State::Unbuilt);
        let (next, outcome) = match state {
            State::Built { store, graph } => match OptimizedLayout::new(&graph, &store) {
                Ok(layout) => (State::Optimized { store, graph, layout }, Ok(())),
                Err(e) => (State::Built { store, graph }, Err(e)),
            },
            optimized @ State::Optimized { .. } => (optimized, Ok(())),
            other => {
                let err = NsgError::InvalidState(format!(
                    "optimize requires a built graph, index is {:?}",
                    phase_of(&other)
                ));
                (other, Err(err))
            }
        };
        self.state = next;
        outcome
    }

    /// Search with the id-indexed graph.
    pub fn search(&self, query: &[f32], params: &SearchParams) -> Result<Vec<(u32, f32)>> {
        params.validate()?;
        let (graph, store) = self.generic_parts("search")?;
        let query = store.align_query(query)?;
        Ok(search::search(&StoreView { graph, store }, &query, params))
    }

    /// Search with the optimized layout. Same results as [`NsgIndex::search`].
    pub fn search_optimized(&self, query: &[f32], params: &SearchParams) -> Result<Vec<(u32, f32)>> {
        params.validate()?;
        let (layout, store) = self.optimized_parts()?;
        let query = store.align_query(query)?;
        Ok(search::search(layout, &query, params))
    }

    /// Run many queries in parallel, returning neighbor ids per query.
    ///
    /// Uses the optimized layout when present. All queries are validated
    /// before any search runs.
    pub fn search_batch<Q: AsRef<[f32]> + Sync>(
        &self,
        queries: &[Q],
        params: &SearchParams,
    ) -> Result<Vec<Vec<u32>>> {
        params.validate()?;
        let (graph, store) = self.generic_parts("search_batch")?;
        let aligned = queries
            .iter()
            .map(|q| store.align_query(q.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        let generic = StoreView { graph, store };
        let view: &dyn GraphView = match self.layout() {
            Some(layout) => layout,
            None => &generic,
        };

        Ok(aligned
            .par_iter()
            .map_init(
                || VisitedSet::new(view.len()),
                |visited, query| {
                    search::search_with(view, query, params, visited)
                        .into_iter()
                        .map(|(id, _)| id)
                        .collect()
                },
            )
            .collect())
    }

    fn generic_parts(&self, op: &str) -> Result<(&NavigableGraph, &VectorStore)> {
        match &self.state {
            State::Built { store, graph } | State::Optimized { store, graph, .. } => Ok((graph, store)),
            other => Err(NsgError::InvalidState(format!(
                "{op} requires a built graph, index is {:?}",
                phase_of(other)
            ))),
        }
    }

    fn optimized_parts(&self) -> Result<(&OptimizedLayout, &VectorStore)> {
        match &self.state {
            State::Optimized { store, layout, .. } => Ok((layout, store)),
            other => Err(NsgError::InvalidState(format!(
                "search_optimized requires an optimized index, index is {:?}",
                phase_of(other)
            ))),
        }
    }

    /// Write the graph topology to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        match &self.state {
            State::Built { graph, .. } | State::Optimized { graph, .. } => persistence::save(graph, path),
            State::Loaded(topology) => persistence::save_topology(topology, path),
            State::Unbuilt => Err(NsgError::InvalidState(
                "save requires a built or loaded graph".to_string(),
            )),
        }
    }

    /// Restore topology from `path`.
    ///
    /// With vectors owned the index becomes Built (entry recomputed as the
    /// medoid); otherwise Loaded until [`NsgIndex::attach_vectors`].
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let topology = persistence::load(path, self.num_points)?;

        let next = match self.store() {
            Some(store) => {
                let store = store.clone();
                let graph = attach(topology, &store)?;
                State::Built { store, graph }
            }
            None => {
                // Structural checks now, so a bad file never reaches Loaded.
                if !topology.is_empty() {
                    NavigableGraph::from_topology(topology.clone(), 0)?;
                }
                State::Loaded(topology)
            }
        };

        self.pending = None;
        self.state = next;
        Ok(())
    }

    /// Supply vectors for a loaded topology, or stage them before `load`.
    pub fn attach_vectors<R: AsRef<[f32]>>(&mut self, points: &[R]) -> Result<()> {
        let store = self.ingest(points)?;
        match &self.state {
            State::Unbuilt => {
                self.pending = Some(store);
                Ok(())
            }
            State::Loaded(topology) => {
                let graph = attach(topology.clone(), &store)?;
                self.state = State::Built { store, graph };
                Ok(())
            }
            other => Err(NsgError::InvalidState(format!(
                "attach_vectors requires an unbuilt or loaded index, index is {:?}",
                phase_of(other)
            ))),
        }
    }

    /// Approximate heap footprint of owned data.
    pub fn size_bytes(&self) -> usize {
        let pending = self.pending.as_ref().map_or(0, VectorStore::size_bytes);
        pending
            + match &self.state {
                State::Unbuilt => 0,
                State::Loaded(t) => t.lists.len() * std::mem::size_of::<crate::graph::NeighborList>(),
                State::Built { store, graph } => store.size_bytes() + graph.size_bytes(),
                State::Optimized { store, graph, layout } => {
                    store.size_bytes() + graph.size_bytes() + layout.size_bytes()
                }
            }
    }
}

fn phase_of(state: &State) -> Phase {
    match state {
        State::Unbuilt => Phase::Unbuilt,
        State::Loaded(_) => Phase::Loaded,
        State::Built { .. } => Phase::Built,
        State::Optimized { .. } => Phase::Optimized,
    }
}

/// Combine restored topology with vectors; the entry is the medoid.
fn attach(topology: Topology, store: &VectorStore) -> Result<NavigableGraph> {
    if topology.len() != store.len() {
        return Err(NsgError::CorruptData(format!(
            "topology has {} nodes, store holds {} points",
            topology.len(),
            store.len()
        )));
    }
    if store.is_empty() {
        return Ok(NavigableGraph::from_parts(Vec::new(), topology.max_degree, 0));
    }
    let entry = select_medoid(store)?;
    NavigableGraph::from_topology(topology, entry)
}
