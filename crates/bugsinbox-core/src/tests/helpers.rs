//! Factory functions for simulations with hand-placed bugs.

use glam::Vec2;

use crate::arena::Rect;
use crate::clock::ClockKind;
use crate::config::SimConfig;
use crate::simulation::Simulation;

/// Tick length used by every test.
pub const DT: f32 = 1.0 / 30.0;

/// Configuration with a fixed seed and a simulated clock.
pub fn test_config(seed: u64, sample_count: usize) -> SimConfig {
    SimConfig {
        seed: Some(seed),
        sample_count,
        clock: ClockKind::Simulated,
        ..Default::default()
    }
}

/// The 1000×1000 box at the origin.
pub fn unit_box() -> Rect {
    Rect::new(Vec2::ZERO, Vec2::splat(1000.0))
}

/// Stopped simulation in [`unit_box`] with randomly placed bugs.
///
/// # Panics
///
/// Panics if `config` does not validate.
pub fn simulation(config: SimConfig) -> Simulation {
    Simulation::with_arena(config, unit_box()).expect("test config is valid")
}

/// Stopped simulation with one stationary founder at each of `positions`.
///
/// # Panics
///
/// Panics if `config` does not validate.
pub fn simulation_at(config: SimConfig, positions: &[Vec2]) -> Simulation {
    let mut sim = simulation(SimConfig {
        sample_count: positions.len().max(1),
        ..config
    });
    for (bug, &position) in sim.bugs_mut().iter_mut().zip(positions) {
        bug.position = position;
        bug.velocity = Vec2::ZERO;
    }
    sim
}

/// Runs `ticks` ticks of [`DT`].
pub fn run(sim: &mut Simulation, ticks: usize) {
    for _ in 0..ticks {
        sim.tick(DT);
    }
}

/// True when every bug lies inside its inset bounds.
pub fn all_contained(sim: &Simulation) -> bool {
    sim.entities()
        .all(|bug| crate::resolver::physics::is_contained(bug, sim.arena()))
}
