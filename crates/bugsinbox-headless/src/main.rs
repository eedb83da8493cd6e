//! Headless driver for the Bugs in a Box simulation.
//!
//! Runs the core at its fixed tick rate without a window until one lineage
//! is left (or a tick budget is spent) and prints the final snapshot as JSON
//! on stdout. Logs go to stderr through `tracing`; set `RUST_LOG=debug` to
//! see every coalescence.
//!
//! ```text
//! bugsinbox-headless --samples 20 --seed 7 > run.json
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bugsinbox_core::{ClockKind, SimConfig, Simulation, Snapshot};
use clap::Parser;
use glam::Vec2;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Viewport the arena is fitted to, matching the interactive window.
const VIEWPORT: Vec2 = Vec2::new(1280.0, 800.0);

/// Tick budget when `--ticks` is not given.
const DEFAULT_MAX_TICKS: u64 = 100_000;

#[derive(Parser, Debug)]
#[command(
    name = "bugsinbox-headless",
    version,
    about = "Run a Bugs in a Box simulation without a window and print the result as JSON"
)]
struct Cli {
    /// JSON file with a (partial) simulation config.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of bugs to start with.
    #[arg(long)]
    samples: Option<usize>,

    /// Run exactly this many ticks instead of stopping at one lineage.
    #[arg(long)]
    ticks: Option<u64>,

    /// RNG seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Enable chase mode.
    #[arg(long)]
    chase: bool,

    /// Enable procreate mode.
    #[arg(long)]
    procreate: bool,
}

fn load_config(path: Option<&Path>) -> Result<SimConfig> {
    let Some(path) = path else {
        return Ok(SimConfig {
            clock: ClockKind::Simulated,
            ..Default::default()
        });
    };
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let value: serde_json::Value =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    let clock_given = value.get("clock").is_some();
    let mut config: SimConfig = serde_json::from_value(value)
        .with_context(|| format!("invalid config in {}", path.display()))?;
    if !clock_given {
        config.clock = ClockKind::Simulated;
    }
    Ok(config)
}

fn build_config(cli: &Cli) -> Result<SimConfig> {
    let mut config = load_config(cli.config.as_deref())?;
    if let Some(samples) = cli.samples {
        config.sample_count = samples;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    Ok(config)
}

fn run(cli: &Cli) -> Result<Snapshot> {
    let config = build_config(cli)?;
    let dt = config.fixed_dt();
    let mut sim = Simulation::new(config, VIEWPORT).context("building simulation")?;
    if cli.chase {
        sim.toggle_chase_mode();
    }
    if cli.procreate {
        sim.toggle_procreate_mode();
    }
    info!(
        samples = sim.lineage_count(),
        chase = sim.chase_mode(),
        procreate = sim.procreate_mode(),
        "starting run"
    );

    sim.start();
    match cli.ticks {
        Some(ticks) => {
            for _ in 0..ticks {
                sim.tick(dt);
            }
        }
        None => {
            while sim.lineage_count() > 1 && sim.tick_count() < DEFAULT_MAX_TICKS {
                sim.tick(dt);
            }
        }
    }
    sim.stop();

    info!(
        ticks = sim.tick_count(),
        lineages = sim.lineage_count(),
        offspring = sim.offspring().len(),
        coalescences = sim.history().len(),
        elapsed = sim.elapsed(),
        "run finished"
    );
    Ok(sim.snapshot())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let snapshot = run(&cli)?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
