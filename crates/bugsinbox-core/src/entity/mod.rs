//! Entity module: the bugs.
//!
//! This module provides:
//! - [`BugId`]: stable identifier a renderer can key sprites on
//! - [`Bug`]: a moving point with velocity, heading and a scaled footprint
//! - [`components`]: rendering-side descriptors ([`Appearance`], [`ImageVariant`])
//!
//! # Geometry
//!
//! A bug is a point. Its size only matters through the *effective radius*
//! `scale × (footprint.x + footprint.y) / 4`, which insets the arena bounds
//! and feeds the coalescence threshold. Heading is derived from motion and is
//! for display only.
//!
//! # Example
//!
//! ```
//! use bugsinbox_core::entity::{Bug, BugId, Generation};
//! use glam::Vec2;
//!
//! let bug = Bug::new(BugId::new(0), Vec2::new(10.0, 10.0), Vec2::splat(64.0), 0.5);
//! assert_eq!(bug.generation, Generation::Founder);
//! assert!((bug.effective_radius() - 16.0).abs() < 1e-6);
//! ```

pub mod components;

use std::f32::consts::PI;
use std::fmt;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::arena::Rect;

pub use components::{Appearance, Generation, ImageVariant};

/// Unique identifier of a bug within one simulation.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BugId(u64);

impl BugId {
    /// Creates a `BugId` from a raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for BugId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BugId({})", self.0)
    }
}

impl fmt::Display for BugId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A bug in the box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bug {
    id: BugId,
    /// Position of the bug's centre.
    pub position: Vec2,
    /// Velocity in units per second.
    pub velocity: Vec2,
    /// Display heading in radians, derived from the last displacement.
    pub heading: f32,
    /// Scale factor applied to the footprint.
    pub scale: f32,
    /// Unscaled width and height.
    pub footprint: Vec2,
    /// Collection the bug belongs to.
    pub generation: Generation,
    /// How the bug is drawn.
    pub appearance: Appearance,
}

impl Bug {
    /// Creates a stationary founder with a shape appearance matching `footprint`.
    #[must_use]
    pub fn new(id: BugId, position: Vec2, footprint: Vec2, scale: f32) -> Self {
        Self {
            id,
            position,
            velocity: Vec2::ZERO,
            heading: 0.0,
            scale,
            footprint,
            generation: Generation::Founder,
            appearance: Appearance::Shape {
                radius: (footprint.x + footprint.y) / 4.0,
            },
        }
    }

    /// Spawns a bug at a uniformly random position inside `rect`.
    ///
    /// The position is drawn from [`Rect::inner_bounds`] for the bug's
    /// effective radius, so a bug larger than the box lands on the lower
    /// bound. The velocity has magnitude `speed` with a direction drawn from `[-π, π]`.
    pub fn spawn<R: Rng + ?Sized>(
        id: BugId,
        rect: &Rect,
        appearance: Appearance,
        scale: f32,
        speed: f32,
        rng: &mut R,
    ) -> Self {
        let footprint = appearance.footprint();
        let radius = scale * (footprint.x + footprint.y) / 4.0;
        let (lo, hi) = rect.inner_bounds(radius);
        let span = hi - lo;
        let position = (lo + Vec2::new(rng.gen::<f32>() * span.x, rng.gen::<f32>() * span.y))
            .clamp(lo, hi);
        let angle = rng.gen_range(-PI..=PI);

        Self {
            id,
            position,
            velocity: Vec2::from_angle(angle) * speed,
            heading: angle,
            scale,
            footprint,
            generation: Generation::Founder,
            appearance,
        }
    }

    /// Identifier of this bug.
    #[must_use]
    pub const fn id(&self) -> BugId {
        self.id
    }

    /// Scale-adjusted half footprint used for boundaries and coalescence.
    #[must_use]
    pub fn effective_radius(&self) -> f32 {
        self.scale * (self.footprint.x + self.footprint.y) / 4.0
    }

    /// Changes the scale. Velocity is unaffected.
    pub fn set_scale(&mut self, scale: f32) {
        self.scale = scale;
    }

    /// Swaps the appearance and adopts its footprint.
    pub fn set_appearance(&mut self, appearance: Appearance) {
        self.footprint = appearance.footprint();
        self.appearance = appearance;
    }

    /// Points the bug in a new direction at `speed`.
    ///
    /// The direction is drawn uniformly from `[min_angle, max_angle]`, or is
    /// exactly `min_angle` when the range is empty.
    pub fn turn<R: Rng + ?Sized>(&mut self, min_angle: f32, max_angle: f32, speed: f32, rng: &mut R) {
        let angle = if max_angle > min_angle {
            rng.gen_range(min_angle..=max_angle)
        } else {
            min_angle
        };
        self.velocity = Vec2::from_angle(angle) * speed;
        self.heading = angle;
    }

    /// Moves the bug so it keeps its fractional offset when `from` becomes `to`.
    pub fn rescale(&mut self, from: &Rect, to: &Rect) {
        self.position = from.remap(self.position, to);
    }

    /// Turns this bug into an offspring.
    #[must_use]
    pub fn into_offspring(mut self) -> Self {
        self.generation = Generation::Offspring;
        self
    }
}
