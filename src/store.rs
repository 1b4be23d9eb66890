//! Engine-owned, SIMD-aligned vector storage.

use crate::error::{NsgError, Result};
use crate::simd;

/// Copy `rows` into a fresh row-major buffer padded to the alignment width.
///
/// Returns `(buffer, aligned_dim)`. Every row must have exactly `dim`
/// elements; the caller's memory is never aliased or modified.
pub fn align<R: AsRef<[f32]>>(rows: &[R], dim: usize) -> Result<(Vec<f32>, usize)> {
    if dim == 0 {
        return Err(NsgError::InvalidInput("dimension must be positive".to_string()));
    }

    let aligned_dim = simd::aligned_dimension(dim);
    let mut buffer = Vec::with_capacity(rows.len() * aligned_dim);

    for (i, row) in rows.iter().enumerate() {
        let row = row.as_ref();
        if row.len() != dim {
            return Err(NsgError::InvalidInput(format!(
                "row {i} has {} elements, expected {dim}",
                row.len()
            )));
        }
        buffer.extend_from_slice(row);
        buffer.resize(buffer.len() + (aligned_dim - dim), 0.0);
    }

    Ok((buffer, aligned_dim))
}

/// Point set owned by the engine, one zero-padded row per id.
#[derive(Clone, Debug, PartialEq)]
pub struct VectorStore {
    data: Vec<f32>,
    dimension: usize,
    aligned_dimension: usize,
    len: usize,
}

impl VectorStore {
    /// Build a store from a rectangular collection of rows.
    pub fn from_rows<R: AsRef<[f32]>>(rows: &[R], dim: usize) -> Result<Self> {
        let (data, aligned_dimension) = align(rows, dim)?;
        Ok(Self {
            data,
            dimension: dim,
            aligned_dimension,
            len: rows.len(),
        })
    }

    /// Build a store from a flat row-major buffer of `n * dim` floats.
    pub fn from_flat(data: &[f32], dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(NsgError::InvalidInput("dimension must be positive".to_string()));
        }
        if data.len() % dim != 0 {
            return Err(NsgError::InvalidInput(format!(
                "flat buffer of {} floats is not a multiple of dimension {dim}",
                data.len()
            )));
        }
        let rows: Vec<&[f32]> = data.chunks_exact(dim).collect();
        Self::from_rows(&rows, dim)
    }

    /// Number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True (unpadded) dimension.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Row width in floats, a multiple of [`simd::LANES`].
    #[inline]
    pub fn aligned_dimension(&self) -> usize {
        self.aligned_dimension
    }

    /// Aligned row for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id >= len()`.
    #[inline]
    pub fn vector(&self, id: u32) -> &[f32] {
        let start = id as usize * self.aligned_dimension;
        &self.data[start..start + self.aligned_dimension]
    }

    /// Squared distance between two stored points.
    #[inline]
    pub fn distance(&self, a: u32, b: u32) -> f32 {
        simd::l2_distance_squared(self.vector(a), self.vector(b))
    }

    /// Squared distance from an aligned query to a stored point.
    #[inline]
    pub fn distance_to(&self, query: &[f32], id: u32) -> f32 {
        simd::l2_distance_squared(query, self.vector(id))
    }

    /// Validate a raw query and return a zero-padded copy.
    pub fn align_query(&self, query: &[f32]) -> Result<Vec<f32>> {
        if query.len() != self.dimension {
            return Err(NsgError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }
        let mut aligned = Vec::with_capacity(self.aligned_dimension);
        aligned.extend_from_slice(query);
        aligned.resize(self.aligned_dimension, 0.0);
        Ok(aligned)
    }

    /// The whole aligned buffer, row-major.
    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Approximate heap footprint.
    pub fn size_bytes(&self) -> usize {
        self.data.len() * std::mem::size_of::<f32>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_pads_to_multiple_of_eight() {
        let rows = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]];
        let (buf, adim) = align(&rows, 3).unwrap();
        assert_eq!(adim, 8);
        assert_eq!(buf.len(), 16);
        assert_eq!(&buf[..3], &[1.0, 2.0, 3.0]);
        assert!(buf[3..8].iter().all(|&x| x == 0.0));
        assert_eq!(&buf[8..11], &[4.0, 5.0, 6.0]);
    }

    #[test]
    fn align_rejects_ragged_rows() {
        let rows = vec![vec![1.0, 2.0], vec![3.0]];
        let err = align(&rows, 2).unwrap_err();
        assert!(matches!(err, NsgError::InvalidInput(ref m) if m.contains("row 1")));
    }

    #[test]
    fn align_rejects_zero_dimension() {
        let rows: Vec<Vec<f32>> = vec![vec![]];
        assert!(align(&rows, 0).is_err());
    }

    #[test]
    fn align_copies_input() {
        let mut rows = vec![vec![1.0_f32; 8]];
        let (buf, _) = align(&rows, 8).unwrap();
        rows[0][0] = 42.0;
        assert_eq!(buf[0], 1.0);
    }

    #[test]
    fn from_flat_matches_from_rows() {
        let flat: Vec<f32> = (0..12).map(|i| i as f32).collect();
        let a = VectorStore::from_flat(&flat, 4).unwrap();
        let rows: Vec<&[f32]> = flat.chunks(4).collect();
        let b = VectorStore::from_rows(&rows, 4).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 3);
        assert_eq!(a.vector(2)[..4], [8.0, 9.0, 10.0, 11.0]);
    }

    #[test]
    fn from_flat_rejects_partial_row() {
        let flat = vec![0.0_f32; 10];
        assert!(VectorStore::from_flat(&flat, 4).is_err());
    }

    #[test]
    fn align_query_checks_dimension() {
        let store = VectorStore::from_rows(&[vec![0.0_f32, 1.0]], 2).unwrap();
        assert!(matches!(
            store.align_query(&[1.0]),
            Err(NsgError::DimensionMismatch { expected: 2, actual: 1 })
        ));
        let q = store.align_query(&[3.0, 4.0]).unwrap();
        assert_eq!(q.len(), 8);
        assert_eq!(store.distance_to(&q, 0), 9.0 + 9.0);
    }
}
