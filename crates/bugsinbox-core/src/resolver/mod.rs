//! Per-tick resolution steps.
//!
//! Each tick the simulation runs these in order:
//!
//! 1. [`physics`]: reflect, clamp, move, clamp every bug
//! 2. [`distance`]: rebuild the all-pairs distance matrix
//! 3. [`interaction`]: when two founders remain and a mode is set, run the
//!    chase/procreate state machine, which may suppress step 4
//! 4. [`coalescence`]: merge the closest pair if it is under the threshold
//!
//! The steps are free functions and small structs over borrowed state; the
//! [`Simulation`](crate::simulation::Simulation) owns everything they touch.

pub mod coalescence;
pub mod distance;
pub mod interaction;
pub mod physics;

pub use coalescence::{merge_threshold, select_for_merge, MergeCandidate};
pub use distance::{DistanceMatrix, SELF_DISTANCE};
pub use interaction::{InteractionMachine, InteractionState, ModeFlags, PairAction};
pub use physics::integrate;
