//! Coalescence selector.
//!
//! Finds the globally closest pair and decides whether it merges. At most
//! one merge happens per tick; the next-closest pair is handled on the
//! following tick.

use super::distance::DistanceMatrix;

/// Divisor turning a reference footprint into the merge threshold.
///
/// The threshold is `scale × (width + height) / MERGE_DIVISOR`, the same in
/// default and chase/procreate modes.
pub const MERGE_DIVISOR: f32 = 2.0;

/// The pair chosen for a merge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergeCandidate {
    /// Row of the winning entry (the surviving bug).
    pub survivor: usize,
    /// Column of the winning entry (the bug to remove).
    pub removed: usize,
    /// Distance between the two.
    pub distance: f32,
}

/// Merge threshold for a reference bug of the given footprint and scale.
#[must_use]
pub fn merge_threshold(scale: f32, footprint_width: f32, footprint_height: f32) -> f32 {
    scale * (footprint_width + footprint_height) / MERGE_DIVISOR
}

/// Picks the closest pair if it is strictly closer than `threshold`.
///
/// Ties follow [`DistanceMatrix::argmin`]: lowest row, then lowest column.
/// The column index is the one to remove.
///
/// # Example
///
/// ```
/// use bugsinbox_core::resolver::coalescence::select_for_merge;
/// use bugsinbox_core::resolver::distance::DistanceMatrix;
/// use glam::Vec2;
///
/// let d = DistanceMatrix::compute(&[Vec2::ZERO, Vec2::new(50.0, 0.0)]);
/// let merge = select_for_merge(&d, 100.0).unwrap();
/// assert_eq!((merge.survivor, merge.removed), (0, 1));
/// assert!(select_for_merge(&d, 50.0).is_none());
/// ```
#[must_use]
pub fn select_for_merge(distances: &DistanceMatrix, threshold: f32) -> Option<MergeCandidate> {
    let (survivor, removed, distance) = distances.argmin()?;
    (distance < threshold).then_some(MergeCandidate {
        survivor,
        removed,
        distance,
    })
}
