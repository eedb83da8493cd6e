//! Simulation configuration.
//!
//! All tunables live in [`SimConfig`]. Every field has a default, so a JSON
//! config file only needs to name the values it overrides:
//!
//! ```
//! use bugsinbox_core::config::SimConfig;
//!
//! let config = SimConfig {
//!     sample_count: 20,
//!     seed: Some(7),
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! assert!((config.fixed_dt() - 1.0 / 30.0).abs() < 1e-6);
//! ```

use serde::{Deserialize, Serialize};

use crate::clock::ClockKind;
use crate::error::{SimError, SimResult};

/// Geometry limits for the arena.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Margin between the viewport edge and the arena after a viewport resize.
    pub margin: f32,
    /// Smallest width/height the arena takes after a viewport resize.
    pub min_viewport_extent: f32,
    /// Smallest width/height the arena takes after a grow/shrink command.
    pub min_extent: f32,
    /// Size change of one grow/shrink command.
    pub grow_step: f32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            margin: 100.0,
            min_viewport_extent: 200.0,
            min_extent: 100.0,
            grow_step: 100.0,
        }
    }
}

/// Tunables of the chase/procreate interaction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Offspring scale relative to the global scale.
    pub offspring_scale: f32,
    /// Lower bound (inclusive) of the randomized chase length in ticks.
    pub min_chase_cycles: u32,
    /// Upper bound (inclusive) of the randomized chase length in ticks.
    pub max_chase_cycles: u32,
    /// The chase hand-off sub-steps until the pair is this many thresholds apart.
    pub separation_factor: f32,
    /// Velocity multiplier applied to both entities when a chase begins.
    pub chase_speed_multiplier: f32,
    /// Multiplier on the analytic estimate of sub-steps needed to separate.
    pub substep_slack: u32,
    /// Absolute cap on sub-steps during one hand-off.
    pub max_substeps: u32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            offspring_scale: 0.4,
            min_chase_cycles: 5,
            max_chase_cycles: 25,
            separation_factor: 1.5,
            chase_speed_multiplier: 2.0,
            substep_slack: 4,
            max_substeps: 10_000,
        }
    }
}

/// Configuration for a [`Simulation`](crate::simulation::Simulation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// RNG seed. `None` seeds from OS entropy.
    pub seed: Option<u64>,
    /// Number of entities seeded at startup and on restart.
    pub sample_count: usize,
    /// Speed magnitude in an arena that is `reference_width` wide.
    pub base_speed: f32,
    /// Arena width at which `base_speed` applies unscaled.
    pub reference_width: f32,
    /// Starting global scale factor.
    pub initial_scale: f32,
    /// Footprint radius of the fallback shape appearance.
    pub shape_radius: f32,
    /// Cadence of the external driver.
    pub tick_rate_hz: f32,
    /// Global scale multiplier of the grow-entities command.
    pub scale_up_factor: f32,
    /// Global scale multiplier of the shrink-entities command.
    pub scale_down_factor: f32,
    /// Time source for coalescence timestamps.
    pub clock: ClockKind,
    /// Arena geometry limits.
    pub arena: ArenaConfig,
    /// Chase/procreate tunables.
    pub interaction: InteractionConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: None,
            sample_count: 100,
            base_speed: 500.0,
            reference_width: 1000.0,
            initial_scale: 0.2,
            shape_radius: 32.0,
            tick_rate_hz: 30.0,
            scale_up_factor: 1.1,
            scale_down_factor: 0.9,
            clock: ClockKind::Wall,
            arena: ArenaConfig::default(),
            interaction: InteractionConfig::default(),
        }
    }
}

impl SimConfig {
    /// Time step matching `tick_rate_hz`.
    #[must_use]
    pub fn fixed_dt(&self) -> f32 {
        1.0 / self.tick_rate_hz
    }

    /// Checks every value against its domain.
    ///
    /// `sample_count == 0` is accepted here; the simulation clamps it to one.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfiguration`] naming the first bad field.
    pub fn validate(&self) -> SimResult<()> {
        let positive = [
            ("base_speed", self.base_speed),
            ("reference_width", self.reference_width),
            ("initial_scale", self.initial_scale),
            ("shape_radius", self.shape_radius),
            ("tick_rate_hz", self.tick_rate_hz),
            ("scale_up_factor", self.scale_up_factor),
            ("scale_down_factor", self.scale_down_factor),
            ("arena.min_viewport_extent", self.arena.min_viewport_extent),
            ("arena.min_extent", self.arena.min_extent),
            ("arena.grow_step", self.arena.grow_step),
            ("interaction.offspring_scale", self.interaction.offspring_scale),
            (
                "interaction.chase_speed_multiplier",
                self.interaction.chase_speed_multiplier,
            ),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(SimError::InvalidConfiguration(format!(
                    "{name} must be finite and positive, got {value}"
                )));
            }
        }

        if !self.arena.margin.is_finite() || self.arena.margin < 0.0 {
            return Err(SimError::InvalidConfiguration(format!(
                "arena.margin must be finite and non-negative, got {}",
                self.arena.margin
            )));
        }

        let i = &self.interaction;
        if i.min_chase_cycles == 0 || i.min_chase_cycles > i.max_chase_cycles {
            return Err(SimError::InvalidConfiguration(format!(
                "chase cycle range {}..={} is empty or starts at zero",
                i.min_chase_cycles, i.max_chase_cycles
            )));
        }
        if !i.separation_factor.is_finite() || i.separation_factor <= 1.0 {
            return Err(SimError::InvalidConfiguration(format!(
                "interaction.separation_factor must exceed 1, got {}",
                i.separation_factor
            )));
        }
        if i.substep_slack == 0 || i.max_substeps == 0 {
            return Err(SimError::InvalidConfiguration(
                "interaction sub-step limits must be non-zero".into(),
            ));
        }

        Ok(())
    }
}
