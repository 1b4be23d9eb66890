//! Entry-point selection.
//!
//! The medoid here is the stored point nearest to the arithmetic centroid,
//! not the point minimising total distance to all others. Computing the
//! centroid is O(n·d) and the scan another O(n·d), which keeps entry
//! selection negligible next to graph construction.

use crate::error::{NsgError, Result};
use crate::simd;
use crate::store::VectorStore;
use rayon::prelude::*;

/// Arithmetic mean of all stored vectors, in aligned layout.
pub fn centroid(store: &VectorStore) -> Vec<f32> {
    let width = store.aligned_dimension();
    let mut sum = vec![0.0_f64; width];
    for row in store.as_slice().chunks_exact(width) {
        for (acc, &x) in sum.iter_mut().zip(row) {
            *acc += f64::from(x);
        }
    }
    let n = store.len().max(1) as f64;
    sum.into_iter().map(|s| (s / n) as f32).collect()
}

/// Id of the point closest to the centroid; ties go to the lowest id.
pub fn select_medoid(store: &VectorStore) -> Result<u32> {
    if store.is_empty() {
        return Err(NsgError::InvalidInput(
            "cannot select a medoid from an empty point set".to_string(),
        ));
    }

    let center = centroid(store);
    let (best, _) = (0..store.len() as u32)
        .into_par_iter()
        .map(|id| (id, simd::l2_distance_squared(&center, store.vector(id))))
        .reduce(
            || (u32::MAX, f32::INFINITY),
            |a, b| match a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)) {
                std::cmp::Ordering::Greater => b,
                _ => a,
            },
        );

    // Only reachable when every distance is NaN.
    Ok(if best == u32::MAX { 0 } else { best })
}
