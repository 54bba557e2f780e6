//! `swarm-cli` – command-line runner for the swarm coordination engine.
//!
//! 1. Loads `~/.swarm/config.toml` if present, else starts from
//!    [`EngineConfig::default`], then applies CLI-flag and `SWARM_*`
//!    env-var overrides.
//! 2. Spawns the requested number of agents at random positions within the
//!    world bounds.
//! 3. Starts the engine and either runs headless or prints a periodic
//!    one-line status line until interrupted.
//! 4. Intercepts Ctrl-C to stop the engine cleanly before exiting.

mod config;

use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use swarm_runtime::{RunState, SystemController};
use swarm_types::EngineConfig;
use tracing::{info, warn};

/// Runs the swarm coordination engine from the command line.
#[derive(Debug, Parser)]
#[command(name = "swarm", version, about)]
struct Cli {
    /// Simulation ticks per second.
    #[arg(long)]
    fps: Option<u32>,

    /// Number of agents to spawn at startup.
    #[arg(long, default_value_t = 0)]
    agents: u32,

    /// World bounds, e.g. `--world 800 600`.
    #[arg(long, num_args = 2, value_names = ["W", "H"])]
    world: Option<Vec<f64>>,

    /// Run without periodic status output.
    #[arg(long, default_value_t = false)]
    headless: bool,
}

const EXIT_OK: u8 = 0;
const EXIT_CONFIG_ERROR: u8 = 2;
const EXIT_RUNTIME_FATAL: u8 = 3;

fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    let mut cfg = match config::load() {
        Ok(Some(cfg)) => cfg,
        Ok(None) => EngineConfig::default(),
        Err(e) => {
            eprintln!("config error: {e}");
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };
    config::apply_env_overrides(&mut cfg);
    apply_cli_overrides(&mut cfg, &cli);

    let controller = match SystemController::new(cfg.clone()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("config error: {e}");
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    let mut rng = SmallRng::from_entropy();
    for _ in 0..cli.agents {
        let x = rng.gen_range(0.0..cfg.world_width);
        let y = rng.gen_range(0.0..cfg.world_height);
        controller.spawn_agent(x, y);
    }
    info!(agents = cli.agents, fps = cfg.target_fps, "engine configured");

    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_for_handler = shutdown.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        shutdown_for_handler.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "failed to install Ctrl-C handler; Ctrl-C will not stop the engine cleanly");
    }

    controller.start();

    while !shutdown.load(Ordering::SeqCst) && controller.run_state() != RunState::Stopped {
        std::thread::sleep(Duration::from_millis(500));
        if !cli.headless {
            let snapshot = controller.snapshot();
            println!(
                "agents={} fps={:.1} tier={:?}",
                snapshot.agents.len(),
                snapshot.stats.current_fps,
                snapshot.stats.tier,
            );
        }
    }

    // A `Stopped` state reached without our own shutdown request means the
    // simulation thread panicked and stopped itself.
    let crashed = !shutdown.load(Ordering::SeqCst) && controller.run_state() == RunState::Stopped;
    controller.stop();
    if crashed {
        eprintln!("engine stopped unexpectedly");
        ExitCode::from(EXIT_RUNTIME_FATAL)
    } else {
        ExitCode::from(EXIT_OK)
    }
}

fn apply_cli_overrides(cfg: &mut EngineConfig, cli: &Cli) {
    if let Some(fps) = cli.fps
        && fps > 0
    {
        cfg.target_fps = fps;
        cfg.update_interval_ms = (1000 / fps).max(1);
    }
    if let Some(world) = &cli.world
        && let [w, h] = world[..]
    {
        cfg.world_width = w;
        cfg.world_height = h;
    }
}

fn init_tracing() {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    if std::env::var("SWARM_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt().with_env_filter(env_filter).with_target(true).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).with_target(true).compact().init();
    }
}
