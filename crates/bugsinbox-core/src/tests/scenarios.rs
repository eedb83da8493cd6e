//! Worked scenarios.

use glam::Vec2;

use super::helpers::{run, simulation_at, test_config, DT};
use crate::arena::Rect;
use crate::config::SimConfig;
use crate::resolver::interaction::InteractionState;
use crate::simulation::Simulation;

// =============================================================================
// Coalescence
// =============================================================================

#[test]
fn close_pair_merges_on_next_tick() {
    // Scale 1 and a 100×100 footprint give a threshold of 100.
    let config = SimConfig {
        initial_scale: 1.0,
        shape_radius: 50.0,
        ..test_config(1, 2)
    };
    let mut sim = simulation_at(config, &[Vec2::new(400.0, 500.0), Vec2::new(450.0, 500.0)]);
    assert_eq!(sim.merge_threshold(), Some(100.0));
    sim.start();

    let outcome = sim.tick(DT);
    assert!(outcome.merged.is_some());
    assert_eq!(sim.population(), 1);
    assert_eq!(sim.history().len(), 1);
    assert_eq!(sim.last_event_time(), sim.history().last());
}

#[test]
fn pair_at_threshold_does_not_merge() {
    let config = SimConfig {
        initial_scale: 1.0,
        shape_radius: 50.0,
        ..test_config(1, 2)
    };
    let mut sim = simulation_at(config, &[Vec2::new(400.0, 500.0), Vec2::new(500.0, 500.0)]);
    sim.start();
    assert!(sim.tick(DT).merged.is_none());
    assert_eq!(sim.population(), 2);
}

#[test]
fn population_runs_down_to_one() {
    let mut sim = super::helpers::simulation(test_config(9, 30));
    sim.start();
    let mut ticks = 0;
    while sim.lineage_count() > 1 && ticks < 200_000 {
        sim.tick(DT);
        ticks += 1;
    }
    assert_eq!(sim.lineage_count(), 1);
    assert_eq!(sim.history().len(), 29);
    let normalized = sim.history().normalized();
    assert!((normalized[28] - 1.0).abs() < 1e-12);
}

// =============================================================================
// Procreation
// =============================================================================

#[test]
fn procreation_adds_one_offspring_without_merging() {
    let mut sim = simulation_at(
        test_config(2, 2),
        &[Vec2::new(500.0, 500.0), Vec2::new(505.0, 500.0)],
    );
    sim.toggle_procreate_mode();
    sim.start();

    let outcome = sim.tick(DT);
    assert!(outcome.spawned.is_some());
    assert_eq!(sim.population(), 3);
    assert_eq!(sim.history().len(), 0);
    assert_eq!(sim.interaction_state(), InteractionState::Procreated);
}

#[test]
fn latch_allows_one_spawn_per_approach() {
    let mut sim = simulation_at(
        test_config(3, 2),
        &[Vec2::new(500.0, 500.0), Vec2::new(505.0, 500.0)],
    );
    sim.toggle_procreate_mode();
    sim.start();

    let spawned: usize = (0..20)
        .map(|_| usize::from(sim.tick(DT).spawned.is_some()))
        .sum();
    assert_eq!(spawned, 1);
    assert_eq!(sim.lineage_count(), 2);
}

// =============================================================================
// Chase
// =============================================================================

#[test]
fn chase_ends_after_exactly_drawn_cycles() {
    let mut config = test_config(4, 2);
    config.interaction.min_chase_cycles = 10;
    config.interaction.max_chase_cycles = 10;
    let mut sim = simulation_at(config, &[Vec2::new(500.0, 500.0), Vec2::new(505.0, 500.0)]);
    sim.toggle_chase_mode();
    sim.start();

    let outcome = sim.tick(DT);
    assert_eq!(outcome.chase_started, Some(10));
    assert!(sim.interaction_state().is_chasing());
    let chase_speed = sim.bugs()[0].velocity.length();

    for tick in 1..10 {
        let outcome = sim.tick(DT);
        assert!(!outcome.chase_ended, "ended early at {tick}");
        assert!(sim.interaction_state().is_chasing());
    }

    let outcome = sim.tick(DT);
    assert!(outcome.chase_ended);
    assert_eq!(sim.interaction_state(), InteractionState::Approaching);

    let first = &sim.bugs()[0];
    assert!((first.velocity.length() - chase_speed / 2.0).abs() < 1e-2);
    assert!((first.heading - first.velocity.y.atan2(first.velocity.x)).abs() < 1e-5);
    assert_eq!(sim.history().len(), 0);
}

#[test]
fn chase_separates_the_pair() {
    let mut sim = simulation_at(
        test_config(5, 2),
        &[Vec2::new(500.0, 500.0), Vec2::new(505.0, 500.0)],
    );
    sim.toggle_chase_mode();
    sim.start();
    sim.tick(DT);

    let threshold = sim.merge_threshold().unwrap();
    let [a, b] = sim.bugs() else {
        panic!("expected a pair");
    };
    assert!(a.position.distance(b.position) >= 1.5 * threshold);
    assert_eq!(a.velocity, b.velocity);
}

// =============================================================================
// Arena
// =============================================================================

#[test]
fn shrink_below_floor_shifts_by_applied_delta() {
    let mut sim = Simulation::with_arena(
        test_config(6, 3),
        Rect::new(Vec2::new(100.0, 100.0), Vec2::splat(300.0)),
    )
    .unwrap();

    sim.resize_arena(-300.0);
    let rect = sim.arena().rect();
    assert_eq!(rect.size, Vec2::splat(100.0));
    assert_eq!(rect.origin, Vec2::splat(200.0));
}

#[test]
fn bugs_stay_in_a_shrinking_box() {
    let mut sim = super::helpers::simulation(test_config(7, 40));
    sim.start();
    for _ in 0..8 {
        sim.shrink_arena();
        run(&mut sim, 5);
        assert!(super::helpers::all_contained(&sim));
    }
}
