//! Cross-module tests of the simulation.
//!
//! - `scenarios.rs`: worked examples of merging, procreation, chasing and
//!   arena clamping
//! - `properties.rs`: proptest properties that must hold for any seed
//! - `determinism.rs`: same seed, same run
//! - `helpers.rs`: factory functions shared by the above

mod helpers;
mod scenarios;

pub use helpers::*;
