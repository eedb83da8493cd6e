//! Output types the simulation hands to the presentation layer.
//!
//! Two channels leave a tick:
//!
//! - [`Cue`]s are fire-and-forget notifications pushed into a [`CueSink`].
//!   The shell plays a sound or flashes a sprite; the core never looks at
//!   what happened to them.
//! - [`TickOutcome`] is the return value of
//!   [`Simulation::tick`](crate::simulation::Simulation::tick) and describes
//!   what the tick did, for tests and headless drivers.
//!
//! # Example
//!
//! ```
//! use bugsinbox_core::output::{Cue, CueSink, MutedCue};
//!
//! let mut recorded: Vec<Cue> = Vec::new();
//! recorded.play(Cue::Coalescence);
//! assert_eq!(recorded, vec![Cue::Coalescence]);
//!
//! // A sink that failed to load its assets swallows everything.
//! MutedCue.play(Cue::Spawn);
//! ```

use std::fmt;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::entity::BugId;

// =============================================================================
// Cues
// =============================================================================

/// Notification for the presentation layer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cue {
    /// Two bugs merged.
    Coalescence,
    /// An offspring was born.
    Spawn,
}

impl Cue {
    /// Lower-case name, as used by the bindings.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Coalescence => "coalescence",
            Self::Spawn => "spawn",
        }
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Receiver of cues.
pub trait CueSink: Send + Sync {
    /// Handles one cue. Must not fail.
    fn play(&mut self, cue: Cue);
}

/// Sink that drops every cue.
#[derive(Debug, Default, Clone, Copy)]
pub struct MutedCue;

impl CueSink for MutedCue {
    fn play(&mut self, _cue: Cue) {}
}

impl CueSink for Vec<Cue> {
    fn play(&mut self, cue: Cue) {
        self.push(cue);
    }
}

/// Shared sink, so an observer can read what the simulation played.
///
/// A poisoned lock drops the cue.
impl<S: CueSink> CueSink for Arc<Mutex<S>> {
    fn play(&mut self, cue: Cue) {
        if let Ok(mut sink) = self.lock() {
            sink.play(cue);
        }
    }
}

// =============================================================================
// Tick Outcome
// =============================================================================

/// A coalescence event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coalescence {
    /// Bug that was removed.
    pub removed: BugId,
    /// Bug it merged into.
    pub survivor: BugId,
    /// Distance at which the pair merged.
    pub distance: f32,
    /// Seconds since the run started.
    pub elapsed: f64,
}

/// Everything a single tick did.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickOutcome {
    /// The merge of this tick, if any.
    pub merged: Option<Coalescence>,
    /// Offspring born this tick.
    pub spawned: Option<BugId>,
    /// Chase length if a chase began this tick.
    pub chase_started: Option<u32>,
    /// A chase reached its length this tick.
    pub chase_ended: bool,
}

impl TickOutcome {
    /// True when the tick changed nothing observable beyond motion.
    #[must_use]
    pub fn is_quiet(&self) -> bool {
        self.merged.is_none()
            && self.spawned.is_none()
            && self.chase_started.is_none()
            && !self.chase_ended
    }

    /// Cues this tick produced, in the order they were played.
    #[must_use]
    pub fn cues(&self) -> Vec<Cue> {
        let mut cues = Vec::new();
        if self.spawned.is_some() {
            cues.push(Cue::Spawn);
        }
        if self.merged.is_some() {
            cues.push(Cue::Coalescence);
        }
        cues
    }
}
