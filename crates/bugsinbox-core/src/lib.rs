//! # Bugsinbox Core
//!
//! Simulation core for "bugs in a box", an interactive model of the Kingman
//! coalescent.
//!
//! A population of bugs moves in straight lines inside a resizable box and
//! bounces off its walls. Whenever the closest pair gets nearer than a
//! threshold the pair coalesces: one bug disappears and the time of the
//! event is recorded. The recorded times form the coalescent genealogy of
//! the starting sample.
//!
//! ## Architecture
//!
//! - **Arena**: the box and the running flag ([`arena`])
//! - **Entities**: bugs with position, velocity and a scaled footprint ([`entity`])
//! - **Resolvers**: motion, distances, coalescence and the chase/procreate
//!   pair interaction ([`resolver`])
//! - **Simulation**: the context object that owns all of the above and is
//!   driven by an external fixed-rate scheduler ([`simulation`])
//!
//! Rendering, sound and input handling live outside this crate. The core
//! reports what happened through [`output::Cue`]s and
//! [`output::TickOutcome`].
//!
//! ## Usage
//!
//! ```
//! use bugsinbox_core::{ClockKind, SimConfig, Simulation};
//! use glam::Vec2;
//!
//! let config = SimConfig {
//!     seed: Some(1),
//!     sample_count: 20,
//!     clock: ClockKind::Simulated,
//!     ..Default::default()
//! };
//! let mut sim = Simulation::new(config, Vec2::new(1280.0, 800.0))?;
//! sim.start();
//! let dt = sim.config().fixed_dt();
//! for _ in 0..300 {
//!     sim.tick(dt);
//! }
//! println!("{} lineages left, merges at {:?}", sim.lineage_count(), sim.history().as_slice());
//! # Ok::<(), bugsinbox_core::SimError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod arena;
pub mod clock;
pub mod config;
pub mod entity;
pub mod error;
pub mod history;
pub mod output;
pub mod resolver;
pub mod simulation;

pub use arena::{Arena, Rect};
pub use clock::{Clock, ClockKind};
pub use config::{ArenaConfig, InteractionConfig, SimConfig};
pub use entity::{Appearance, Bug, BugId, Generation, ImageVariant};
pub use error::{SimError, SimResult};
pub use history::CoalescenceHistory;
pub use output::{Coalescence, Cue, CueSink, MutedCue, TickOutcome};
pub use resolver::{InteractionState, ModeFlags};
pub use simulation::{Simulation, Snapshot};

#[cfg(test)]
mod tests;
