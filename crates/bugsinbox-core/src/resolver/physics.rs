//! Motion and boundary integration.
//!
//! Each tick a bug:
//! 1. Reflects any velocity component whose position sits at or past a bound
//! 2. Is clamped into bounds (pre-move clamp)
//! 3. Moves `position += velocity * dt`
//! 4. Is clamped again (post-move clamp)
//!
//! The double clamp keeps a bug inside the box even when `dt` is large
//! because the driver dropped frames. Reflection is axis-aligned; there is no
//! bug-to-bug collision response.

use glam::Vec2;

use crate::arena::Arena;
use crate::entity::Bug;

/// Displacements shorter than this leave the heading untouched.
const HEADING_EPSILON: f32 = 1e-6;

/// Advances one bug by `dt` seconds. Does nothing while the arena is stopped.
///
/// # Example
///
/// ```
/// use bugsinbox_core::arena::{Arena, Rect};
/// use bugsinbox_core::config::ArenaConfig;
/// use bugsinbox_core::entity::{Bug, BugId};
/// use bugsinbox_core::resolver::physics::integrate;
/// use glam::Vec2;
///
/// let mut arena = Arena::new(Rect::new(Vec2::ZERO, Vec2::splat(500.0)), ArenaConfig::default());
/// arena.set_running(true);
///
/// let mut bug = Bug::new(BugId::new(0), Vec2::new(250.0, 250.0), Vec2::splat(20.0), 1.0);
/// bug.velocity = Vec2::new(100.0, 0.0);
/// integrate(&mut bug, &arena, 0.5);
/// assert_eq!(bug.position, Vec2::new(300.0, 250.0));
/// ```
pub fn integrate(bug: &mut Bug, arena: &Arena, dt: f32) {
    if !arena.is_running() {
        return;
    }

    let (lo, hi) = arena.rect().inner_bounds(bug.effective_radius());

    bug.velocity = reflected(bug.position, bug.velocity, lo, hi);

    let old = bug.position;
    bug.position = bug.position.clamp(lo, hi);
    bug.position += bug.velocity * dt;
    bug.position = bug.position.clamp(lo, hi);

    let moved = bug.position - old;
    if moved.length_squared() > HEADING_EPSILON * HEADING_EPSILON {
        bug.heading = moved.y.atan2(moved.x);
    }
}

/// Returns true when the bug lies inside its inset bounds.
#[must_use]
pub fn is_contained(bug: &Bug, arena: &Arena) -> bool {
    let (lo, hi) = arena.rect().inner_bounds(bug.effective_radius());
    bug.position.cmpge(lo).all() && bug.position.cmple(hi).all()
}

/// Speed of a freshly spawned or turned bug in this arena.
///
/// Speed scales with arena width so that large windows feel the same.
#[must_use]
pub fn speed_for(arena: &Arena, base_speed: f32, reference_width: f32) -> f32 {
    base_speed * arena.width() / reference_width
}

/// Negates each velocity component whose position coordinate is at or
/// beyond `lo`/`hi` on that axis.
#[must_use]
pub fn reflected(position: Vec2, velocity: Vec2, lo: Vec2, hi: Vec2) -> Vec2 {
    let mut v = velocity;
    if position.x <= lo.x || position.x >= hi.x {
        v.x = -v.x;
    }
    if position.y <= lo.y || position.y >= hi.y {
        v.y = -v.y;
    }
    v
}
