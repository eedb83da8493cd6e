//! Error types for the simulation core.
//!
//! The taxonomy is narrow. Most out-of-range inputs (arena
//! shrinking below its floor, removing from an empty population) are clamped
//! or ignored instead of reported, so a running simulation never surfaces an
//! error to the presentation layer.

/// Errors produced by the simulation core.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimError {
    /// A configuration value is out of its valid domain.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The chase hand-off could not separate the pair within the sub-step cap.
    ///
    /// Raised when the pursuing entity has (near) zero speed or keeps bouncing
    /// inside the separation radius.
    #[error("degenerate interaction: pair did not separate after {substeps} sub-steps")]
    DegenerateInteraction {
        /// Sub-steps taken before giving up.
        substeps: u32,
    },
}

/// Result alias used throughout the core.
pub type SimResult<T> = Result<T, SimError>;
