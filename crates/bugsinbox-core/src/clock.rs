//! Time source for coalescence timestamps.
//!
//! Coalescence times are reported in seconds since the run started. The
//! interactive shell wants wall-clock time; tests and headless runs want a
//! clock that only moves when the simulation ticks.

use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Which clock a simulation uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockKind {
    /// Monotonic wall clock.
    #[default]
    Wall,
    /// Sum of the `dt` values passed to running ticks.
    Simulated,
}

/// A running clock.
#[derive(Debug, Clone)]
pub enum Clock {
    /// Seconds since `epoch`.
    Wall {
        /// Instant the clock was created.
        epoch: Instant,
    },
    /// Seconds accumulated by [`Clock::advance`].
    Simulated {
        /// Current reading.
        now: f64,
    },
}

impl Clock {
    /// Creates a clock of the given kind reading zero.
    #[must_use]
    pub fn new(kind: ClockKind) -> Self {
        match kind {
            ClockKind::Wall => Self::Wall {
                epoch: Instant::now(),
            },
            ClockKind::Simulated => Self::Simulated { now: 0.0 },
        }
    }

    /// Current reading in seconds.
    #[must_use]
    pub fn now(&self) -> f64 {
        match self {
            Self::Wall { epoch } => epoch.elapsed().as_secs_f64(),
            Self::Simulated { now } => *now,
        }
    }

    /// Advances a simulated clock by `dt` seconds. Wall clocks ignore this.
    pub fn advance(&mut self, dt: f32) {
        if let Self::Simulated { now } = self {
            *now += f64::from(dt.max(0.0));
        }
    }
}
