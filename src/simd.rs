//! Squared Euclidean distance over aligned vectors.
//!
//! When the `innr` feature is enabled (default), uses the `innr` crate for
//! SIMD-accelerated distance. Otherwise falls back to portable code.
//!
//! Every vector the engine stores is zero-padded to a multiple of [`LANES`],
//! so both kernels always see rows of equal length, and generic and
//! optimized search compute bit-identical distances.
//!
//! ```rust
//! use nsg::simd::l2_distance_squared;
//!
//! let a = [0.0_f32, 0.0, 0.0];
//! let b = [1.0_f32, 2.0, 2.0];
//! assert!((l2_distance_squared(&a, &b) - 9.0).abs() < 1e-6);
//! ```

/// Alignment width, in floats.
pub const LANES: usize = 8;

/// Smallest multiple of [`LANES`] that is `>= dim`.
#[inline]
#[must_use]
pub const fn aligned_dimension(dim: usize) -> usize {
    dim.div_ceil(LANES) * LANES
}

#[cfg(feature = "innr")]
pub use innr::l2_distance_squared;

#[cfg(not(feature = "innr"))]
mod fallback {
    //! Portable fallback when innr is not available.
    //!
    //! The loop runs over whole 8-wide chunks with independent accumulators,
    //! which LLVM turns into packed SIMD on any target with 128-bit or wider
    //! registers.

    use super::LANES;

    /// L2 distance squared.
    ///
    /// Slices are compared up to the shorter length.
    #[inline]
    #[must_use]
    pub fn l2_distance_squared(a: &[f32], b: &[f32]) -> f32 {
        let len = a.len().min(b.len());
        let (a, b) = (&a[..len], &b[..len]);

        let mut acc = [0.0_f32; LANES];
        let a_chunks = a.chunks_exact(LANES);
        let b_chunks = b.chunks_exact(LANES);
        let a_tail = a_chunks.remainder();
        let b_tail = b_chunks.remainder();

        for (ca, cb) in a_chunks.zip(b_chunks) {
            for lane in 0..LANES {
                let d = ca[lane] - cb[lane];
                acc[lane] += d * d;
            }
        }

        // Fixed reduction order keeps results bit-identical across call sites.
        let mut sum = ((acc[0] + acc[4]) + (acc[1] + acc[5])) + ((acc[2] + acc[6]) + (acc[3] + acc[7]));
        for (x, y) in a_tail.iter().zip(b_tail) {
            let d = x - y;
            sum += d * d;
        }
        sum
    }
}

#[cfg(not(feature = "innr"))]
pub use fallback::*;
