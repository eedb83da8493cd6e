//! Arena module: the resizable box that confines every entity.
//!
//! The arena is an axis-aligned rectangle plus the `running` flag that gates
//! the simulation. It never rejects input: sizes are clamped to configured
//! floors instead.
//!
//! # Resizing
//!
//! There are two ways the box changes size:
//!
//! - [`Arena::resize`] grows or shrinks both dimensions by the same delta and
//!   shifts the origin by half of the *applied* delta, so the box stays centred.
//! - [`Arena::fit_viewport`] re-derives the box from the viewport, keeping a
//!   fixed margin.
//!
//! Both return the box before and after the change; callers remap contained
//! entities with [`Rect::remap`] so their relative layout survives.
//!
//! # Example
//!
//! ```
//! use bugsinbox_core::arena::Arena;
//! use bugsinbox_core::config::ArenaConfig;
//! use glam::Vec2;
//!
//! let mut arena = Arena::for_viewport(Vec2::new(1280.0, 800.0), ArenaConfig::default());
//! assert_eq!(arena.rect().size, Vec2::new(1080.0, 600.0));
//!
//! let (before, after) = arena.resize(-2000.0);
//! assert_eq!(after.size, Vec2::new(100.0, 100.0));
//! assert_eq!(after.center(), before.center());
//! ```

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::ArenaConfig;

// =============================================================================
// Rect
// =============================================================================

/// Axis-aligned rectangle given by its lower-left origin and size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Lower-left corner.
    pub origin: Vec2,
    /// Width and height.
    pub size: Vec2,
}

impl Rect {
    /// Creates a rectangle.
    #[must_use]
    pub const fn new(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    /// Centre point.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.origin + self.size * 0.5
    }

    /// Bounds a point of radius `radius` may occupy.
    ///
    /// The point is inset by `radius / 2` on every side, which yields
    /// `[x0, x0 + W - r]` with `x0 = origin + r / 2`. When the box is smaller
    /// than the entity both bounds collapse onto the lower one.
    #[must_use]
    pub fn inner_bounds(&self, radius: f32) -> (Vec2, Vec2) {
        let lo = self.origin + Vec2::splat(radius * 0.5);
        let hi = (lo + self.size - Vec2::splat(radius)).max(lo);
        (lo, hi)
    }

    /// Maps `point` from this rectangle to `to`, preserving its fractional
    /// offset. Degenerate source rectangles leave the point unchanged.
    #[must_use]
    pub fn remap(&self, point: Vec2, to: &Rect) -> Vec2 {
        if self.size.x <= 0.0 || self.size.y <= 0.0 {
            return point;
        }
        let fraction = (point - self.origin) / self.size;
        to.origin + fraction * to.size
    }
}

// =============================================================================
// Arena
// =============================================================================

/// The box entities live in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    rect: Rect,
    running: bool,
    limits: ArenaConfig,
}

impl Arena {
    /// Creates an arena with an explicit rectangle. Sizes below the floor are
    /// raised to it.
    #[must_use]
    pub fn new(rect: Rect, limits: ArenaConfig) -> Self {
        let size = rect.size.max(Vec2::splat(limits.min_extent));
        Self {
            rect: Rect::new(rect.origin, size),
            running: false,
            limits,
        }
    }

    /// Creates the arena that fits a viewport of the given size.
    #[must_use]
    pub fn for_viewport(viewport: Vec2, limits: ArenaConfig) -> Self {
        Self {
            rect: Self::viewport_rect(viewport, &limits),
            running: false,
            limits,
        }
    }

    fn viewport_rect(viewport: Vec2, limits: &ArenaConfig) -> Rect {
        let size = (viewport - Vec2::splat(2.0 * limits.margin))
            .max(Vec2::splat(limits.min_viewport_extent));
        Rect::new(Vec2::splat(limits.margin), size)
    }

    /// Current rectangle.
    #[must_use]
    pub const fn rect(&self) -> Rect {
        self.rect
    }

    /// Width of the box.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.rect.size.x
    }

    /// Height of the box.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.rect.size.y
    }

    /// Whether simulated time advances.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Sets the running flag.
    pub fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    /// Grows (positive) or shrinks (negative) both dimensions by `delta`.
    ///
    /// Each dimension is floored at `min_extent`, and the origin moves by half
    /// of the change actually applied so the centre is preserved.
    ///
    /// Returns the rectangle before and after.
    pub fn resize(&mut self, delta: f32) -> (Rect, Rect) {
        let before = self.rect;
        let size = (before.size + Vec2::splat(delta)).max(Vec2::splat(self.limits.min_extent));
        let applied = size - before.size;
        self.rect = Rect::new(before.origin - applied * 0.5, size);
        (before, self.rect)
    }

    /// Recomputes the box for a new viewport size.
    ///
    /// Returns the rectangle before and after.
    pub fn fit_viewport(&mut self, viewport: Vec2) -> (Rect, Rect) {
        let before = self.rect;
        self.rect = Self::viewport_rect(viewport, &self.limits);
        (before, self.rect)
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new(
            Rect::new(Vec2::ZERO, Vec2::splat(1000.0)),
            ArenaConfig::default(),
        )
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn arena_300() -> Arena {
        Arena::new(
            Rect::new(Vec2::new(100.0, 100.0), Vec2::new(300.0, 300.0)),
            ArenaConfig::default(),
        )
    }

    mod rect_tests {
        use super::*;

        #[test]
        fn inner_bounds_inset_by_half_radius() {
            let rect = Rect::new(Vec2::new(10.0, 20.0), Vec2::new(100.0, 50.0));
            let (lo, hi) = rect.inner_bounds(10.0);
            assert_eq!(lo, Vec2::new(15.0, 25.0));
            assert_eq!(hi, Vec2::new(105.0, 65.0));
        }

        #[test]
        fn inner_bounds_collapse_when_entity_is_larger_than_box() {
            let rect = Rect::new(Vec2::ZERO, Vec2::new(10.0, 10.0));
            let (lo, hi) = rect.inner_bounds(40.0);
            assert_eq!(lo, hi);
        }

        #[test]
        fn remap_preserves_fraction() {
            let from = Rect::new(Vec2::ZERO, Vec2::new(100.0, 200.0));
            let to = Rect::new(Vec2::new(50.0, 50.0), Vec2::new(400.0, 400.0));
            let mapped = from.remap(Vec2::new(25.0, 50.0), &to);
            assert_eq!(mapped, Vec2::new(150.0, 150.0));
        }

        #[test]
        fn remap_from_degenerate_rect_is_identity() {
            let from = Rect::new(Vec2::ZERO, Vec2::new(0.0, 10.0));
            let to = Rect::new(Vec2::ZERO, Vec2::splat(100.0));
            assert_eq!(from.remap(Vec2::new(3.0, 4.0), &to), Vec2::new(3.0, 4.0));
        }
    }

    mod resize_tests {
        use super::*;

        #[test]
        fn grow_keeps_center() {
            let mut arena = arena_300();
            let (before, after) = arena.resize(100.0);
            assert_eq!(after.size, Vec2::new(400.0, 400.0));
            assert_eq!(after.origin, Vec2::new(50.0, 50.0));
            assert_eq!(before.center(), after.center());
        }

        #[test]
        fn shrink_clamps_and_shifts_by_applied_delta() {
            let mut arena = arena_300();
            let (_, after) = arena.resize(-300.0);
            assert_eq!(after.size, Vec2::new(100.0, 100.0));
            // Only 200 of the requested 300 were applied.
            assert_eq!(after.origin, Vec2::new(200.0, 200.0));
        }

        #[test]
        fn shrink_at_floor_is_noop() {
            let mut arena = Arena::new(
                Rect::new(Vec2::ZERO, Vec2::splat(100.0)),
                ArenaConfig::default(),
            );
            let (before, after) = arena.resize(-100.0);
            assert_eq!(before, after);
        }

        #[test]
        fn new_raises_size_to_floor() {
            let arena = Arena::new(Rect::new(Vec2::ZERO, Vec2::splat(5.0)), ArenaConfig::default());
            assert_eq!(arena.rect().size, Vec2::splat(100.0));
        }
    }

    mod viewport_tests {
        use super::*;

        #[test]
        fn fit_viewport_uses_margin() {
            let mut arena = arena_300();
            let (_, after) = arena.fit_viewport(Vec2::new(1280.0, 800.0));
            assert_eq!(after.origin, Vec2::new(100.0, 100.0));
            assert_eq!(after.size, Vec2::new(1080.0, 600.0));
        }

        #[test]
        fn tiny_viewport_floors_at_min_extent() {
            let mut arena = arena_300();
            let (_, after) = arena.fit_viewport(Vec2::new(250.0, 50.0));
            assert_eq!(after.size, Vec2::new(200.0, 200.0));
        }

        #[test]
        fn running_flag_defaults_off() {
            let mut arena = Arena::default();
            assert!(!arena.is_running());
            arena.set_running(true);
            assert!(arena.is_running());
        }
    }
}
