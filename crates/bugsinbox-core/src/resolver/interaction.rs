//! Chase/procreate interaction between the last two bugs.
//!
//! When exactly two founders remain and at least one of the modes in
//! [`ModeFlags`] is set, a close approach no longer has to end in a merge:
//!
//! - **Procreate**: an offspring appears at the first bug's position and the
//!   pair is latched until it separates again, so one approach spawns once.
//! - **Chase**: the first bug turns away, the second is snapped onto it and
//!   the first is sub-stepped until they are `separation_factor` thresholds
//!   apart. Both then run at doubled speed for a random number of ticks.
//!
//! # States
//!
//! ```text
//!   Idle ──(2 founders + mode)──▶ Approaching ──(close, chase)──▶ Chasing
//!                                   ▲   │                           │
//!                                   │   └─(close, procreate)─▶ Procreated
//!                                   │                               │
//!                                   └──(cycles elapsed / pair apart)┘
//! ```
//!
//! Procreation wins when both modes are set.

use std::f32::consts::FRAC_PI_2;

use bitflags::bitflags;
use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::arena::Arena;
use crate::config::InteractionConfig;
use crate::entity::Bug;
use crate::error::{SimError, SimResult};

use super::physics;

bitflags! {
    /// Interaction modes toggled by the user.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct ModeFlags: u8 {
        /// Close approaches start a chase instead of a merge.
        const CHASE = 1 << 0;
        /// Close approaches spawn an offspring instead of a merge.
        const PROCREATE = 1 << 1;
    }
}

/// Where the interaction state machine is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum InteractionState {
    /// No mode is set or the population is not a pair.
    #[default]
    Idle,
    /// Both bugs move under the default integrator.
    Approaching,
    /// The pair runs at boosted speed until the chase length is reached.
    Chasing {
        /// Ticks elapsed since the chase began.
        cycles_since_start: u32,
        /// Chase length drawn when it began.
        cycles_to_chase: u32,
    },
    /// An offspring was spawned during the current close approach.
    Procreated,
}

impl InteractionState {
    /// True while a chase is running.
    #[must_use]
    pub const fn is_chasing(&self) -> bool {
        matches!(self, Self::Chasing { .. })
    }

    /// True while the one-shot procreation latch is set.
    #[must_use]
    pub const fn has_procreated(&self) -> bool {
        matches!(self, Self::Procreated)
    }
}

/// What the pair step asks the simulation to do.
#[derive(Debug, Clone, PartialEq)]
pub enum PairAction {
    /// Nothing special; default coalescence runs.
    Proceed,
    /// Spawn an offspring at `position`; coalescence is suppressed this tick.
    Spawn {
        /// Where the offspring appears.
        position: Vec2,
    },
    /// The pair is still close after procreating; coalescence is suppressed.
    Latched,
    /// A chase began; positions changed, so distances must be recomputed.
    ChaseStarted {
        /// Chase length in ticks.
        cycles_to_chase: u32,
        /// Sub-steps the hand-off took.
        substeps: u32,
    },
    /// The chase hand-off gave up; default coalescence runs.
    Degenerate(SimError),
}

/// Result of one pair step.
#[derive(Debug, Clone, PartialEq)]
pub struct PairOutcome {
    /// A running chase reached its length this tick.
    pub chase_ended: bool,
    /// Follow-up requested from the simulation.
    pub action: PairAction,
}

impl PairOutcome {
    /// Whether default coalescence must be skipped this tick.
    #[must_use]
    pub fn suppresses_coalescence(&self) -> bool {
        matches!(self.action, PairAction::Spawn { .. } | PairAction::Latched)
    }
}

/// Per-tick inputs shared by the pair step and the hand-off.
#[derive(Debug)]
pub struct PairContext<'a> {
    /// Box the pair moves in.
    pub arena: &'a Arena,
    /// Active modes; must not be empty.
    pub modes: ModeFlags,
    /// Interaction threshold.
    pub threshold: f32,
    /// Speed of a turned bug.
    pub speed: f32,
    /// Tick length.
    pub dt: f32,
    /// Tunables.
    pub config: &'a InteractionConfig,
}

/// The chase/procreate state machine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionMachine {
    state: InteractionState,
}

impl InteractionMachine {
    /// Creates an idle machine.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> InteractionState {
        self.state
    }

    /// Forces a state. Used by restarts and tests.
    pub fn set_state(&mut self, state: InteractionState) {
        self.state = state;
    }

    /// Clears the chase counters and the procreation latch.
    pub fn reset(&mut self) {
        self.state = InteractionState::Idle;
    }

    /// Runs one tick for the pair `[first, second]` at `distance` apart.
    ///
    /// # Panics
    ///
    /// Panics if `pair` does not hold exactly two bugs.
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        pair: &mut [Bug],
        distance: f32,
        ctx: &PairContext<'_>,
        rng: &mut R,
    ) -> PairOutcome {
        let len = pair.len();
        let [first, _] = &mut *pair else {
            panic!("interaction step needs exactly two bugs, got {len}");
        };

        if self.state == InteractionState::Idle {
            self.state = InteractionState::Approaching;
        }

        let mut chase_ended = false;
        if let InteractionState::Chasing {
            cycles_since_start,
            cycles_to_chase,
        } = self.state
        {
            let elapsed = cycles_since_start + 1;
            if elapsed >= cycles_to_chase {
                first.turn(-FRAC_PI_2, FRAC_PI_2, ctx.speed, rng);
                self.state = InteractionState::Approaching;
                chase_ended = true;
                debug!(cycles = elapsed, "chase ended");
            } else {
                self.state = InteractionState::Chasing {
                    cycles_since_start: elapsed,
                    cycles_to_chase,
                };
            }
        }

        if self.state == InteractionState::Procreated {
            if distance < ctx.threshold {
                return PairOutcome {
                    chase_ended,
                    action: PairAction::Latched,
                };
            }
            self.state = InteractionState::Approaching;
        }

        if distance >= ctx.threshold {
            return PairOutcome {
                chase_ended,
                action: PairAction::Proceed,
            };
        }

        let action = if ctx.modes.contains(ModeFlags::PROCREATE) {
            self.state = InteractionState::Procreated;
            debug!(x = first.position.x, y = first.position.y, "procreating");
            PairAction::Spawn {
                position: first.position,
            }
        } else {
            match hand_off(pair, ctx, rng) {
                Ok(substeps) => {
                    let cycles_to_chase = rng.gen_range(
                        ctx.config.min_chase_cycles..=ctx.config.max_chase_cycles,
                    );
                    self.state = InteractionState::Chasing {
                        cycles_since_start: 0,
                        cycles_to_chase,
                    };
                    debug!(cycles_to_chase, substeps, "chase started");
                    PairAction::ChaseStarted {
                        cycles_to_chase,
                        substeps,
                    }
                }
                Err(err) => {
                    warn!(error = %err, "chase hand-off aborted, falling back to coalescence");
                    self.state = InteractionState::Approaching;
                    PairAction::Degenerate(err)
                }
            }
        };

        PairOutcome {
            chase_ended,
            action,
        }
    }
}

/// Separates a pair that just met so the chase can begin.
///
/// The first bug turns to a random heading in `[-π/2, π/2]`, the second is
/// snapped onto it at rest, and the first is integrated until the pair is
/// `separation_factor × threshold` apart. The second then copies the first's
/// velocity and both are sped up by `chase_speed_multiplier`.
///
/// The loop is capped at `substep_slack` times the straight-line estimate,
/// never more than `max_substeps`.
///
/// # Errors
///
/// [`SimError::DegenerateInteraction`] when the first bug has no speed or the
/// cap is reached. Both bugs are then restored to their state before the
/// call, so the caller can fall back to a plain merge.
///
/// # Panics
///
/// Panics if `pair` does not hold exactly two bugs.
pub fn hand_off<R: Rng + ?Sized>(
    pair: &mut [Bug],
    ctx: &PairContext<'_>,
    rng: &mut R,
) -> SimResult<u32> {
    let len = pair.len();
    let [chaser, target] = pair else {
        panic!("hand-off needs exactly two bugs, got {len}");
    };

    let saved = (chaser.clone(), target.clone());
    let result = separate(chaser, target, ctx, rng);
    if result.is_err() {
        let (chaser_before, target_before) = saved;
        *chaser = chaser_before;
        *target = target_before;
    }
    result
}

fn separate<R: Rng + ?Sized>(
    chaser: &mut Bug,
    target: &mut Bug,
    ctx: &PairContext<'_>,
    rng: &mut R,
) -> SimResult<u32> {
    chaser.turn(-FRAC_PI_2, FRAC_PI_2, ctx.speed, rng);
    target.position = chaser.position;
    target.velocity = Vec2::ZERO;

    let separation = ctx.config.separation_factor * ctx.threshold;
    let step = chaser.velocity.length() * ctx.dt;
    if !step.is_finite() || step <= f32::EPSILON {
        return Err(SimError::DegenerateInteraction { substeps: 0 });
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let estimate = (separation / step).ceil().min(u32::MAX as f32) as u32;
    let cap = estimate
        .saturating_mul(ctx.config.substep_slack)
        .clamp(1, ctx.config.max_substeps);

    let mut substeps = 0;
    while chaser.position.distance(target.position) < separation {
        if substeps >= cap {
            return Err(SimError::DegenerateInteraction { substeps });
        }
        physics::integrate(chaser, ctx.arena, ctx.dt);
        substeps += 1;
    }

    target.velocity = chaser.velocity;
    target.heading = chaser.heading;
    chaser.velocity *= ctx.config.chase_speed_multiplier;
    target.velocity *= ctx.config.chase_speed_multiplier;
    Ok(substeps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Rect;
    use crate::config::ArenaConfig;
    use crate::entity::BugId;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const THRESHOLD: f32 = 20.0;

    fn running_arena() -> Arena {
        let mut arena = Arena::new(
            Rect::new(Vec2::ZERO, Vec2::splat(1000.0)),
            ArenaConfig::default(),
        );
        arena.set_running(true);
        arena
    }

    fn pair(gap: f32) -> Vec<Bug> {
        let mut a = Bug::new(BugId::new(0), Vec2::new(500.0, 500.0), Vec2::splat(20.0), 1.0);
        let mut b = Bug::new(BugId::new(1), Vec2::new(500.0 + gap, 500.0), Vec2::splat(20.0), 1.0);
        a.velocity = Vec2::new(10.0, 0.0);
        b.velocity = Vec2::new(-10.0, 0.0);
        vec![a, b]
    }

    fn ctx<'a>(arena: &'a Arena, config: &'a InteractionConfig, modes: ModeFlags) -> PairContext<'a> {
        PairContext {
            arena,
            modes,
            threshold: THRESHOLD,
            speed: 300.0,
            dt: 1.0 / 30.0,
            config,
        }
    }

    mod procreate_tests {
        use super::*;

        #[test]
        fn close_pair_spawns_once_per_approach() {
            let arena = running_arena();
            let config = InteractionConfig::default();
            let ctx = ctx(&arena, &config, ModeFlags::PROCREATE);
            let mut rng = ChaCha8Rng::seed_from_u64(1);
            let mut machine = InteractionMachine::new();
            let mut bugs = pair(5.0);

            let first = machine.step(&mut bugs, 5.0, &ctx, &mut rng);
            assert_eq!(
                first.action,
                PairAction::Spawn {
                    position: Vec2::new(500.0, 500.0)
                }
            );
            assert!(first.suppresses_coalescence());
            assert!(machine.state().has_procreated());

            let second = machine.step(&mut bugs, 6.0, &ctx, &mut rng);
            assert_eq!(second.action, PairAction::Latched);
            assert!(second.suppresses_coalescence());
        }

        #[test]
        fn separation_clears_latch() {
            let arena = running_arena();
            let config = InteractionConfig::default();
            let ctx = ctx(&arena, &config, ModeFlags::PROCREATE);
            let mut rng = ChaCha8Rng::seed_from_u64(2);
            let mut machine = InteractionMachine::new();
            machine.set_state(InteractionState::Procreated);
            let mut bugs = pair(50.0);

            let outcome = machine.step(&mut bugs, 50.0, &ctx, &mut rng);
            assert_eq!(outcome.action, PairAction::Proceed);
            assert_eq!(machine.state(), InteractionState::Approaching);

            let again = machine.step(&mut bugs, 1.0, &ctx, &mut rng);
            assert!(matches!(again.action, PairAction::Spawn { .. }));
        }

        #[test]
        fn procreate_wins_over_chase() {
            let arena = running_arena();
            let config = InteractionConfig::default();
            let ctx = ctx(&arena, &config, ModeFlags::all());
            let mut rng = ChaCha8Rng::seed_from_u64(3);
            let mut machine = InteractionMachine::new();
            let mut bugs = pair(1.0);
            let outcome = machine.step(&mut bugs, 1.0, &ctx, &mut rng);
            assert!(matches!(outcome.action, PairAction::Spawn { .. }));
        }
    }

    mod chase_tests {
        use super::*;

        #[test]
        fn close_pair_starts_chase() {
            let arena = running_arena();
            let config = InteractionConfig::default();
            let ctx = ctx(&arena, &config, ModeFlags::CHASE);
            let mut rng = ChaCha8Rng::seed_from_u64(4);
            let mut machine = InteractionMachine::new();
            let mut bugs = pair(5.0);

            let outcome = machine.step(&mut bugs, 5.0, &ctx, &mut rng);
            let PairAction::ChaseStarted {
                cycles_to_chase, ..
            } = outcome.action
            else {
                panic!("expected chase, got {:?}", outcome.action);
            };
            assert!((5..=25).contains(&cycles_to_chase));
            assert!(machine.state().is_chasing());
            assert!(!outcome.suppresses_coalescence());

            assert!(bugs[0].position.distance(bugs[1].position) >= 1.5 * THRESHOLD);
            assert_eq!(bugs[0].velocity, bugs[1].velocity);
            assert!((bugs[0].velocity.length() - 600.0).abs() < 1e-2);
        }

        #[test]
        fn chase_ends_after_drawn_cycles() {
            let arena = running_arena();
            let config = InteractionConfig::default();
            let ctx = ctx(&arena, &config, ModeFlags::CHASE);
            let mut rng = ChaCha8Rng::seed_from_u64(5);
            let mut machine = InteractionMachine::new();
            machine.set_state(InteractionState::Chasing {
                cycles_since_start: 0,
                cycles_to_chase: 3,
            });
            let mut bugs = pair(400.0);

            assert!(!machine.step(&mut bugs, 400.0, &ctx, &mut rng).chase_ended);
            assert!(!machine.step(&mut bugs, 400.0, &ctx, &mut rng).chase_ended);
            let velocity_before = bugs[0].velocity;
            let third = machine.step(&mut bugs, 400.0, &ctx, &mut rng);
            assert!(third.chase_ended);
            assert_eq!(machine.state(), InteractionState::Approaching);
            assert_ne!(bugs[0].velocity, velocity_before);
            assert!((bugs[0].velocity.length() - 300.0).abs() < 1e-2);
        }

        #[test]
        fn zero_speed_hand_off_is_degenerate() {
            let arena = running_arena();
            let config = InteractionConfig::default();
            let mut ctx = ctx(&arena, &config, ModeFlags::CHASE);
            ctx.speed = 0.0;
            let mut rng = ChaCha8Rng::seed_from_u64(6);
            let mut machine = InteractionMachine::new();
            let mut bugs = pair(5.0);

            let outcome = machine.step(&mut bugs, 5.0, &ctx, &mut rng);
            assert_eq!(
                outcome.action,
                PairAction::Degenerate(SimError::DegenerateInteraction { substeps: 0 })
            );
            assert_eq!(machine.state(), InteractionState::Approaching);
            assert_eq!(bugs, pair(5.0));
        }

        #[test]
        fn cramped_arena_hits_substep_cap() {
            // The box is narrower than the separation distance.
            let mut arena = Arena::new(
                Rect::new(Vec2::ZERO, Vec2::splat(100.0)),
                ArenaConfig::default(),
            );
            arena.set_running(true);
            let config = InteractionConfig {
                separation_factor: 10.0,
                ..Default::default()
            };
            let ctx = PairContext {
                arena: &arena,
                modes: ModeFlags::CHASE,
                threshold: 50.0,
                speed: 100.0,
                dt: 1.0 / 30.0,
                config: &config,
            };
            let mut rng = ChaCha8Rng::seed_from_u64(7);
            let mut bugs = pair(2.0);
            bugs[0].position = Vec2::splat(50.0);
            bugs[1].position = Vec2::new(52.0, 50.0);
            let before = bugs.clone();

            let err = hand_off(&mut bugs, &ctx, &mut rng).unwrap_err();
            assert!(matches!(err, SimError::DegenerateInteraction { substeps } if substeps > 0));
            assert_eq!(bugs, before);
            assert_ne!(bugs[1].velocity, Vec2::ZERO);
        }

        #[test]
        fn far_pair_proceeds() {
            let arena = running_arena();
            let config = InteractionConfig::default();
            let ctx = ctx(&arena, &config, ModeFlags::CHASE);
            let mut rng = ChaCha8Rng::seed_from_u64(8);
            let mut machine = InteractionMachine::new();
            let mut bugs = pair(300.0);
            let outcome = machine.step(&mut bugs, 300.0, &ctx, &mut rng);
            assert_eq!(outcome.action, PairAction::Proceed);
            assert_eq!(machine.state(), InteractionState::Approaching);
        }
    }

    #[test]
    fn reset_returns_to_idle() {
        let mut machine = InteractionMachine::new();
        machine.set_state(InteractionState::Procreated);
        machine.reset();
        assert_eq!(machine.state(), InteractionState::Idle);
    }

    #[test]
    fn mode_flags_toggle() {
        let mut modes = ModeFlags::empty();
        modes.toggle(ModeFlags::CHASE);
        assert!(modes.contains(ModeFlags::CHASE));
        modes.toggle(ModeFlags::CHASE);
        assert!(modes.is_empty());
    }
}
