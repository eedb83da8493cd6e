//! Simulation context: the owner of all mutable state.
//!
//! A [`Simulation`] holds the arena, both bug collections, the coalescence
//! history, the mode flags and the interaction state machine. The caller
//! drives it by calling [`Simulation::tick`] at a fixed cadence and the
//! command methods in between; there is no process-wide state.
//!
//! # Tick
//!
//! 1. Nothing happens while the arena is stopped
//! 2. Every bug is integrated (founders first, then offspring)
//! 3. The distance matrix is rebuilt over founders followed by offspring
//! 4. With exactly two founders and a mode set, the pair state machine runs;
//!    a spawn or a still-close latched pair skips step 5
//! 5. The closest pair under the threshold merges: the column entry of the
//!    winning matrix cell is removed and its time recorded
//!
//! At most one merge happens per tick.
//!
//! # Example
//!
//! ```
//! use bugsinbox_core::clock::ClockKind;
//! use bugsinbox_core::config::SimConfig;
//! use bugsinbox_core::simulation::Simulation;
//! use glam::Vec2;
//!
//! let config = SimConfig {
//!     seed: Some(42),
//!     sample_count: 10,
//!     clock: ClockKind::Simulated,
//!     ..Default::default()
//! };
//! let mut sim = Simulation::new(config, Vec2::new(1280.0, 800.0)).unwrap();
//! assert_eq!(sim.population(), 10);
//!
//! // Stopped simulations do not move.
//! assert!(sim.tick(1.0 / 30.0).is_quiet());
//!
//! sim.start();
//! for _ in 0..100 {
//!     sim.tick(1.0 / 30.0);
//! }
//! assert!(sim.population() <= 10);
//! assert_eq!(sim.history().len(), 10 - sim.population());
//! ```

use std::fmt;

use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::arena::{Arena, Rect};
use crate::clock::Clock;
use crate::config::SimConfig;
use crate::entity::{Appearance, Bug, BugId, ImageVariant};
use crate::error::SimResult;
use crate::history::CoalescenceHistory;
use crate::output::{Coalescence, Cue, CueSink, MutedCue, TickOutcome};
use crate::resolver::coalescence::{self, MergeCandidate};
use crate::resolver::distance::DistanceMatrix;
use crate::resolver::interaction::{
    InteractionMachine, InteractionState, ModeFlags, PairAction, PairContext,
};
use crate::resolver::physics;

// =============================================================================
// Snapshot
// =============================================================================

/// Read-only copy of the observable state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Ticks run so far.
    pub tick: u64,
    /// Seconds since the run started.
    pub elapsed: f64,
    /// Time of the latest coalescence.
    pub last_event_time: Option<f64>,
    /// Whether time advances.
    pub running: bool,
    /// Arena rectangle.
    pub arena: Rect,
    /// Active interaction modes.
    pub modes: ModeFlags,
    /// Pair state machine.
    pub interaction: InteractionState,
    /// Global scale factor.
    pub global_scale: f32,
    /// Number of founders left.
    pub lineage_count: usize,
    /// Founders.
    pub bugs: Vec<Bug>,
    /// Offspring.
    pub offspring: Vec<Bug>,
    /// Merge times.
    pub history: CoalescenceHistory,
}

// =============================================================================
// Simulation
// =============================================================================

/// The bugs-in-a-box simulation.
///
/// Founders and offspring are kept in two ordered collections. Wherever the
/// two are combined (distance matrix, positions for rendering) founders come
/// first.
pub struct Simulation {
    config: SimConfig,
    arena: Arena,
    bugs: Vec<Bug>,
    kids: Vec<Bug>,
    history: CoalescenceHistory,
    modes: ModeFlags,
    machine: InteractionMachine,
    global_scale: f32,
    appearance: Appearance,
    rng: ChaCha8Rng,
    clock: Clock,
    start_time: f64,
    cues: Box<dyn CueSink>,
    tick: u64,
    next_id: u64,
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("arena", &self.arena)
            .field("bugs", &self.bugs.len())
            .field("kids", &self.kids.len())
            .field("history", &self.history.len())
            .field("modes", &self.modes)
            .field("machine", &self.machine)
            .field("global_scale", &self.global_scale)
            .field("tick", &self.tick)
            .finish_non_exhaustive()
    }
}

impl Simulation {
    /// Creates a stopped simulation whose arena fits `viewport`, seeded with
    /// `config.sample_count` bugs drawn as plain shapes.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfiguration`](crate::error::SimError) if
    /// the configuration does not validate.
    pub fn new(config: SimConfig, viewport: Vec2) -> SimResult<Self> {
        let shape = Appearance::Shape {
            radius: config.shape_radius,
        };
        Self::with_appearance(config, viewport, shape)
    }

    /// Creates a stopped simulation whose arena fits `viewport`, seeded with
    /// `config.sample_count` bugs drawn with `appearance`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfiguration`](crate::error::SimError) if
    /// the configuration does not validate or the footprint is not positive.
    pub fn with_appearance(
        config: SimConfig,
        viewport: Vec2,
        appearance: Appearance,
    ) -> SimResult<Self> {
        let arena = Arena::for_viewport(viewport, config.arena);
        Self::build(config, arena, appearance)
    }

    /// Creates a stopped simulation with an explicit arena rectangle.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfiguration`](crate::error::SimError) if
    /// the configuration does not validate.
    pub fn with_arena(config: SimConfig, rect: Rect) -> SimResult<Self> {
        let arena = Arena::new(rect, config.arena);
        let shape = Appearance::Shape {
            radius: config.shape_radius,
        };
        Self::build(config, arena, shape)
    }

    fn build(config: SimConfig, arena: Arena, appearance: Appearance) -> SimResult<Self> {
        config.validate()?;
        appearance.validate()?;

        let rng = config
            .seed
            .map_or_else(ChaCha8Rng::from_entropy, ChaCha8Rng::seed_from_u64);
        let clock = Clock::new(config.clock);
        let start_time = clock.now();

        let mut sim = Self {
            arena,
            bugs: Vec::new(),
            kids: Vec::new(),
            history: CoalescenceHistory::new(),
            modes: ModeFlags::empty(),
            machine: InteractionMachine::new(),
            global_scale: config.initial_scale,
            appearance,
            rng,
            clock,
            start_time,
            cues: Box::new(MutedCue),
            tick: 0,
            next_id: 0,
            config,
        };
        let count = clamp_sample_count(sim.config.sample_count);
        sim.seed_population(count);

        debug!(
            population = sim.bugs.len(),
            width = sim.arena.width(),
            height = sim.arena.height(),
            "simulation created"
        );
        Ok(sim)
    }

    /// Replaces the cue sink. The default sink is muted.
    pub fn set_cue_sink(&mut self, sink: Box<dyn CueSink>) {
        self.cues = sink;
    }

    // -------------------------------------------------------------------------
    // Tick
    // -------------------------------------------------------------------------

    /// Advances the simulation by `dt` seconds.
    pub fn tick(&mut self, dt: f32) -> TickOutcome {
        let mut outcome = TickOutcome::default();
        if !self.arena.is_running() {
            return outcome;
        }

        self.clock.advance(dt);
        self.tick += 1;
        trace!(
            tick = self.tick,
            bugs = self.bugs.len(),
            kids = self.kids.len(),
            "tick"
        );

        for bug in self.bugs.iter_mut().chain(self.kids.iter_mut()) {
            physics::integrate(bug, &self.arena, dt);
        }

        let Some(threshold) = self.merge_threshold() else {
            return outcome;
        };
        let mut distances = DistanceMatrix::compute(&self.positions());

        if self.interaction_active() {
            let speed = self.speed();
            let ctx = PairContext {
                arena: &self.arena,
                modes: self.modes,
                threshold,
                speed,
                dt,
                config: &self.config.interaction,
            };
            let pair = self
                .machine
                .step(&mut self.bugs, distances.get(0, 1), &ctx, &mut self.rng);

            outcome.chase_ended = pair.chase_ended;
            let suppress = pair.suppresses_coalescence();
            match pair.action {
                PairAction::Spawn { position } => {
                    outcome.spawned = Some(self.spawn_offspring(position));
                    self.cues.play(Cue::Spawn);
                }
                PairAction::ChaseStarted {
                    cycles_to_chase, ..
                } => {
                    outcome.chase_started = Some(cycles_to_chase);
                    distances = DistanceMatrix::compute(&self.positions());
                }
                PairAction::Degenerate(_) => {
                    distances = DistanceMatrix::compute(&self.positions());
                }
                PairAction::Proceed | PairAction::Latched => {}
            }
            if suppress {
                return outcome;
            }
        } else if self.machine.state() != InteractionState::Idle {
            self.machine.reset();
        }

        if let Some(merge) = coalescence::select_for_merge(&distances, threshold) {
            outcome.merged = Some(self.coalesce(merge));
        }
        outcome
    }

    fn interaction_active(&self) -> bool {
        self.bugs.len() == 2 && !self.modes.is_empty()
    }

    fn coalesce(&mut self, merge: MergeCandidate) -> Coalescence {
        let survivor = self.entity_at(merge.survivor).id();
        let removed = self.remove_at(merge.removed).id();
        let now = self.elapsed();
        self.history.record(now);
        let elapsed = self.history.last().unwrap_or_default();
        self.cues.play(Cue::Coalescence);

        debug!(
            %removed,
            %survivor,
            distance = merge.distance,
            elapsed,
            lineages = self.bugs.len(),
            "coalescence"
        );
        Coalescence {
            removed,
            survivor,
            distance: merge.distance,
            elapsed,
        }
    }

    /// Entity at a combined index (founders, then offspring).
    fn entity_at(&self, index: usize) -> &Bug {
        match index.checked_sub(self.bugs.len()) {
            None => &self.bugs[index],
            Some(kid) => &self.kids[kid],
        }
    }

    fn remove_at(&mut self, index: usize) -> Bug {
        match index.checked_sub(self.bugs.len()) {
            None => self.bugs.remove(index),
            Some(kid) => self.kids.remove(kid),
        }
    }

    // -------------------------------------------------------------------------
    // Population
    // -------------------------------------------------------------------------

    fn next_bug_id(&mut self) -> BugId {
        let id = BugId::new(self.next_id);
        self.next_id += 1;
        id
    }

    fn speed(&self) -> f32 {
        physics::speed_for(
            &self.arena,
            self.config.base_speed,
            self.config.reference_width,
        )
    }

    fn spawn_founder(&mut self) -> BugId {
        let id = self.next_bug_id();
        let speed = self.speed();
        let bug = Bug::spawn(
            id,
            &self.arena.rect(),
            self.appearance,
            self.global_scale,
            speed,
            &mut self.rng,
        );
        self.bugs.push(bug);
        id
    }

    fn spawn_offspring(&mut self, position: Vec2) -> BugId {
        let id = self.next_bug_id();
        let speed = self.speed();
        let mut kid = Bug::spawn(
            id,
            &self.arena.rect(),
            self.appearance,
            self.global_scale * self.config.interaction.offspring_scale,
            speed,
            &mut self.rng,
        )
        .into_offspring();
        kid.position = position;
        self.kids.push(kid);
        debug!(%id, offspring = self.kids.len(), "offspring spawned");
        id
    }

    fn seed_population(&mut self, count: usize) {
        for _ in 0..count {
            self.spawn_founder();
        }
    }

    /// Adds one founder at a random position.
    pub fn add_entity(&mut self) -> BugId {
        let id = self.spawn_founder();
        debug!(%id, lineages = self.bugs.len(), "bug added");
        id
    }

    /// Removes the most recently added founder. Does nothing when there are
    /// none.
    pub fn remove_last_entity(&mut self) -> Option<BugId> {
        let removed = self.bugs.pop().map(|bug| bug.id());
        if let Some(id) = removed {
            debug!(%id, lineages = self.bugs.len(), "bug removed");
        }
        removed
    }

    // -------------------------------------------------------------------------
    // Arena
    // -------------------------------------------------------------------------

    fn rescale_all(&mut self, from: &Rect, to: &Rect) {
        for bug in self.bugs.iter_mut().chain(self.kids.iter_mut()) {
            bug.rescale(from, to);
        }
    }

    /// Grows (positive) or shrinks (negative) the arena about its centre and
    /// remaps every bug into the new box.
    pub fn resize_arena(&mut self, delta: f32) {
        let (before, after) = self.arena.resize(delta);
        self.rescale_all(&before, &after);
        debug!(
            delta,
            width = after.size.x,
            height = after.size.y,
            "arena resized"
        );
    }

    /// Grows the arena by one configured step.
    pub fn grow_arena(&mut self) {
        self.resize_arena(self.config.arena.grow_step);
    }

    /// Shrinks the arena by one configured step.
    pub fn shrink_arena(&mut self) {
        self.resize_arena(-self.config.arena.grow_step);
    }

    /// Refits the arena to a resized viewport and remaps every bug.
    pub fn on_viewport_resize(&mut self, width: f32, height: f32) {
        let (before, after) = self.arena.fit_viewport(Vec2::new(width, height));
        self.rescale_all(&before, &after);
        info!(
            viewport_width = width,
            viewport_height = height,
            width = after.size.x,
            height = after.size.y,
            "viewport resized"
        );
    }

    // -------------------------------------------------------------------------
    // Scale and appearance
    // -------------------------------------------------------------------------

    /// Sets the global scale. Founders take it as is, offspring take it times
    /// the offspring factor. Non-finite or non-positive values are ignored.
    pub fn set_global_scale(&mut self, scale: f32) {
        if !scale.is_finite() || scale <= 0.0 {
            warn!(scale, "ignoring invalid global scale");
            return;
        }
        self.global_scale = scale;
        for bug in &mut self.bugs {
            bug.set_scale(scale);
        }
        let kid_scale = scale * self.config.interaction.offspring_scale;
        for kid in &mut self.kids {
            kid.set_scale(kid_scale);
        }
    }

    /// Multiplies the global scale by the configured grow factor.
    pub fn grow_entities(&mut self) {
        self.set_global_scale(self.global_scale * self.config.scale_up_factor);
    }

    /// Multiplies the global scale by the configured shrink factor.
    pub fn shrink_entities(&mut self) {
        self.set_global_scale(self.global_scale * self.config.scale_down_factor);
    }

    /// Redraws every founder and every future bug with `appearance`.
    /// An appearance whose footprint is not finite and positive is ignored.
    pub fn change_appearance(&mut self, appearance: Appearance) {
        if let Err(err) = appearance.validate() {
            warn!(error = %err, "appearance change ignored");
            return;
        }
        self.appearance = appearance;
        for bug in &mut self.bugs {
            bug.set_appearance(appearance);
        }
    }

    // -------------------------------------------------------------------------
    // Modes and lifecycle
    // -------------------------------------------------------------------------

    /// Toggles chase mode and clears the pair state machine.
    pub fn toggle_chase_mode(&mut self) {
        self.modes.toggle(ModeFlags::CHASE);
        self.machine.reset();
        debug!(chase = self.chase_mode(), "chase mode toggled");
    }

    /// Toggles procreate mode and clears the pair state machine.
    pub fn toggle_procreate_mode(&mut self) {
        self.modes.toggle(ModeFlags::PROCREATE);
        self.machine.reset();
        debug!(procreate = self.procreate_mode(), "procreate mode toggled");
    }

    /// Lets time advance.
    ///
    /// The start time is re-based only while no coalescence has been
    /// recorded, so pausing and resuming keeps the history ordered.
    pub fn start(&mut self) {
        if self.history.is_empty() {
            self.start_time = self.clock.now();
        }
        self.arena.set_running(true);
    }

    /// Freezes time.
    pub fn stop(&mut self) {
        self.arena.set_running(false);
    }

    /// Starts a stopped simulation or stops a running one.
    pub fn toggle_running(&mut self) {
        if self.arena.is_running() {
            self.stop();
        } else {
            self.start();
        }
    }

    /// Discards every bug and the history and seeds `sample_count` founders
    /// drawn with `appearance`. Modes are cleared and the simulation is left
    /// stopped. A count of zero is raised to one. An appearance whose
    /// footprint is not finite and positive is replaced by the current one.
    pub fn restart(&mut self, sample_count: usize, appearance: Appearance) {
        let count = clamp_sample_count(sample_count);
        let appearance = match appearance.validate() {
            Ok(()) => appearance,
            Err(err) => {
                warn!(error = %err, "restart keeps the current appearance");
                self.appearance
            }
        };
        self.bugs.clear();
        self.kids.clear();
        self.history.clear();
        self.modes = ModeFlags::empty();
        self.machine.reset();
        self.arena.set_running(false);
        self.appearance = appearance;
        self.seed_population(count);
        self.start_time = self.clock.now();
        info!(population = count, image = ?appearance.image(), "restarted");
    }

    /// Restarts with the mouse lemur sprite of the given image size.
    pub fn restart_cute(&mut self, sample_count: usize, footprint: Vec2) {
        self.restart(
            sample_count,
            Appearance::Sprite {
                image: ImageVariant::MouseLemur,
                footprint,
            },
        );
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Founders, oldest first.
    #[must_use]
    pub fn bugs(&self) -> &[Bug] {
        &self.bugs
    }

    /// Mutable founders, for placing bugs by hand.
    pub fn bugs_mut(&mut self) -> &mut [Bug] {
        &mut self.bugs
    }

    /// Offspring, oldest first.
    #[must_use]
    pub fn offspring(&self) -> &[Bug] {
        &self.kids
    }

    /// Founders followed by offspring.
    pub fn entities(&self) -> impl Iterator<Item = &Bug> {
        self.bugs.iter().chain(self.kids.iter())
    }

    /// Positions of [`Simulation::entities`].
    #[must_use]
    pub fn positions(&self) -> Vec<Vec2> {
        self.entities().map(|bug| bug.position).collect()
    }

    /// Founders plus offspring.
    #[must_use]
    pub fn population(&self) -> usize {
        self.bugs.len() + self.kids.len()
    }

    /// Founders left: the number of lineages.
    #[must_use]
    pub fn lineage_count(&self) -> usize {
        self.bugs.len()
    }

    /// Coalescence history of the current run.
    #[must_use]
    pub const fn history(&self) -> &CoalescenceHistory {
        &self.history
    }

    /// Seconds since the run started.
    #[must_use]
    pub fn elapsed(&self) -> f64 {
        (self.clock.now() - self.start_time).max(0.0)
    }

    /// Time of the latest coalescence.
    #[must_use]
    pub fn last_event_time(&self) -> Option<f64> {
        self.history.last()
    }

    /// State of the pair state machine.
    #[must_use]
    pub const fn interaction_state(&self) -> InteractionState {
        self.machine.state()
    }

    /// Active interaction modes.
    #[must_use]
    pub const fn modes(&self) -> ModeFlags {
        self.modes
    }

    /// Whether chase mode is on.
    #[must_use]
    pub fn chase_mode(&self) -> bool {
        self.modes.contains(ModeFlags::CHASE)
    }

    /// Whether procreate mode is on.
    #[must_use]
    pub fn procreate_mode(&self) -> bool {
        self.modes.contains(ModeFlags::PROCREATE)
    }

    /// Whether time advances.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.arena.is_running()
    }

    /// The arena.
    #[must_use]
    pub const fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Global scale factor.
    #[must_use]
    pub const fn global_scale(&self) -> f32 {
        self.global_scale
    }

    /// Configuration in force.
    #[must_use]
    pub const fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Ticks run since creation.
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Distance under which two bugs merge, derived from the global scale
    /// and the first bug's footprint. `None` without any bug.
    #[must_use]
    pub fn merge_threshold(&self) -> Option<f32> {
        let reference = self.entities().next()?;
        Some(coalescence::merge_threshold(
            self.global_scale,
            reference.footprint.x,
            reference.footprint.y,
        ))
    }

    /// Copy of the observable state.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tick: self.tick,
            elapsed: self.elapsed(),
            last_event_time: self.last_event_time(),
            running: self.is_running(),
            arena: self.arena.rect(),
            modes: self.modes,
            interaction: self.machine.state(),
            global_scale: self.global_scale,
            lineage_count: self.lineage_count(),
            bugs: self.bugs.clone(),
            offspring: self.kids.clone(),
            history: self.history.clone(),
        }
    }
}

fn clamp_sample_count(count: usize) -> usize {
    if count == 0 {
        warn!("sample count 0 raised to 1");
        1
    } else {
        count
    }
}
