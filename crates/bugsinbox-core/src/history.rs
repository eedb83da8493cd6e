//! Coalescence history: when each merge happened.
//!
//! An append-only list of elapsed times in seconds since the run started,
//! one per coalescence. Only a restart clears it.

use serde::{Deserialize, Serialize};

/// Ordered merge times of the current run.
///
/// # Example
///
/// ```
/// use bugsinbox_core::history::CoalescenceHistory;
///
/// let mut history = CoalescenceHistory::new();
/// history.record(2.0);
/// history.record(8.0);
/// assert_eq!(history.len(), 2);
/// assert_eq!(history.normalized(), vec![0.25, 1.0]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoalescenceHistory {
    times: Vec<f64>,
}

impl CoalescenceHistory {
    /// Creates an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a merge time.
    ///
    /// Times earlier than the last entry are raised to it, so the sequence
    /// stays non-decreasing.
    pub fn record(&mut self, elapsed: f64) {
        let elapsed = self.last().map_or(elapsed, |last| elapsed.max(last));
        self.times.push(elapsed);
    }

    /// All merge times, oldest first.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.times
    }

    /// Most recent merge time.
    #[must_use]
    pub fn last(&self) -> Option<f64> {
        self.times.last().copied()
    }

    /// Number of merges.
    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// True before the first merge.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Forgets every merge.
    pub fn clear(&mut self) {
        self.times.clear();
    }

    /// Each time divided by the latest one, for drawing a timeline whose
    /// right edge is the most recent merge.
    ///
    /// All zeros map to `1.0` so a merge at time zero still shows up.
    #[must_use]
    pub fn normalized(&self) -> Vec<f64> {
        match self.last() {
            Some(last) if last > 0.0 => self.times.iter().map(|t| t / last).collect(),
            Some(_) => vec![1.0; self.times.len()],
            None => Vec::new(),
        }
    }
}
