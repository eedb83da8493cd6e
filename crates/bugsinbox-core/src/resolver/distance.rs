//! Pairwise distance engine.
//!
//! Builds the full N×N Euclidean distance matrix of the current positions.
//! The matrix is rebuilt from scratch every tick because bugs are added and
//! removed between ticks; O(N²) is fine for populations in the low hundreds.
//!
//! # Layout
//!
//! Row-major `Vec<f32>`. The diagonal holds [`SELF_DISTANCE`], which is larger
//! than any real distance, so a bug is never its own nearest neighbour.
//!
//! # Symmetry
//!
//! `D[i][j]` and `D[j][i]` are bitwise equal: `(a - b).length()` and
//! `(b - a).length()` square the same magnitudes.

use glam::Vec2;
use rayon::prelude::*;

/// Diagonal sentinel.
pub const SELF_DISTANCE: f32 = f32::INFINITY;

/// Populations at or above this size fill rows in parallel.
const PARALLEL_ROWS: usize = 256;

/// Symmetric all-pairs distance matrix.
///
/// # Example
///
/// ```
/// use bugsinbox_core::resolver::distance::{DistanceMatrix, SELF_DISTANCE};
/// use glam::Vec2;
///
/// let d = DistanceMatrix::compute(&[Vec2::ZERO, Vec2::new(3.0, 4.0)]);
/// assert_eq!(d.get(0, 1), 5.0);
/// assert_eq!(d.get(1, 0), 5.0);
/// assert_eq!(d.get(1, 1), SELF_DISTANCE);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    n: usize,
    data: Vec<f32>,
}

impl DistanceMatrix {
    /// Computes the matrix for `positions`, in order.
    #[must_use]
    pub fn compute(positions: &[Vec2]) -> Self {
        let n = positions.len();
        let mut data = vec![0.0; n * n];

        let fill_row = |(i, row): (usize, &mut [f32])| {
            let a = positions[i];
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = if i == j {
                    SELF_DISTANCE
                } else {
                    a.distance(positions[j])
                };
            }
        };

        if n >= PARALLEL_ROWS {
            data.par_chunks_mut(n).enumerate().for_each(fill_row);
        } else if n > 0 {
            data.chunks_mut(n).enumerate().for_each(fill_row);
        }

        Self { n, data }
    }

    /// Number of rows (and columns).
    #[must_use]
    pub const fn len(&self) -> usize {
        self.n
    }

    /// True for the 0×0 matrix.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Entry at row `i`, column `j`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> f32 {
        assert!(i < self.n && j < self.n, "index ({i}, {j}) out of {0}x{0}", self.n);
        self.data[i * self.n + j]
    }

    /// Smallest entry and its `(row, column)`.
    ///
    /// Scans row-major and keeps the first strictly smaller value, so ties go
    /// to the lowest row and then the lowest column. Returns `None` when no
    /// off-diagonal entry exists.
    #[must_use]
    pub fn argmin(&self) -> Option<(usize, usize, f32)> {
        if self.len() < 2 {
            return None;
        }
        let mut best: Option<(usize, usize, f32)> = None;
        for (k, &d) in self.data.iter().enumerate() {
            if d == SELF_DISTANCE {
                continue;
            }
            if best.map_or(true, |(_, _, b)| d < b) {
                best = Some((k / self.n, k % self.n, d));
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Vec2> {
        vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 10.0),
        ]
    }

    #[test]
    fn empty_and_single() {
        let empty = DistanceMatrix::compute(&[]);
        assert!(empty.is_empty());
        assert_eq!(empty.argmin(), None);

        let one = DistanceMatrix::compute(&[Vec2::ONE]);
        assert_eq!(one.len(), 1);
        assert_eq!(one.get(0, 0), SELF_DISTANCE);
        assert_eq!(one.argmin(), None);
    }

    #[test]
    fn symmetric_with_sentinel_diagonal() {
        let d = DistanceMatrix::compute(&square());
        for i in 0..4 {
            assert_eq!(d.get(i, i), SELF_DISTANCE);
            for j in 0..4 {
                assert_eq!(d.get(i, j).to_bits(), d.get(j, i).to_bits());
            }
        }
        assert!((d.get(0, 2) - 200.0_f32.sqrt()).abs() < 1e-5);
    }

    #[test]
    fn argmin_ties_go_to_lowest_row_then_column() {
        // All four sides of the square tie at 10.
        let d = DistanceMatrix::compute(&square());
        assert_eq!(d.argmin(), Some((0, 1, 10.0)));
    }

    #[test]
    fn argmin_finds_closest_pair() {
        let d = DistanceMatrix::compute(&[
            Vec2::new(0.0, 0.0),
            Vec2::new(100.0, 0.0),
            Vec2::new(103.0, 4.0),
        ]);
        assert_eq!(d.argmin(), Some((1, 2, 5.0)));
    }

    #[test]
    fn coincident_points_have_zero_distance() {
        let d = DistanceMatrix::compute(&[Vec2::ONE, Vec2::ONE]);
        assert_eq!(d.argmin(), Some((0, 1, 0.0)));
    }

    #[test]
    fn parallel_path_matches_sequential_layout() {
        let positions: Vec<Vec2> = (0..300)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let t = i as f32;
                Vec2::new(t * 3.0, (t * 0.7).sin() * 50.0)
            })
            .collect();
        let d = DistanceMatrix::compute(&positions);
        assert_eq!(d.len(), 300);
        assert_eq!(d.get(17, 17), SELF_DISTANCE);
        assert_eq!(d.get(5, 250), positions[5].distance(positions[250]));
        assert_eq!(d.get(250, 5).to_bits(), d.get(5, 250).to_bits());
    }
}
