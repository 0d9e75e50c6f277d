//! headless-runner: drive the simulation without a renderer.
//!
//! Loads an optional JSON config (the demo world otherwise), feeds the game
//! loop a synthetic frame clock, and logs lifecycle events and a periodic
//! summary.
//!
//! Usage:
//!   headless-runner --frames 3600
//!   headless-runner --config world.json --fast --dump

use std::path::PathBuf;
use std::time::{Duration, TryFromFloatSecsError};

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use tower_defense_core::config::{LoopConfig, SimConfig};
use tower_defense_core::events::SimEvent;
use tower_defense_core::state::RenderFrame;
use tower_defense_sim::world_setup;
use tower_defense_sim::{FrameOutcome, FrameSink, GameLoop, SimulationEngine};

#[derive(Parser, Debug)]
#[command(name = "headless-runner")]
#[command(about = "Run the tower defense simulation headless")]
struct Args {
    /// JSON config file; the demo world is used when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of frames to run
    #[arg(long, default_value = "600")]
    frames: u32,

    /// Real milliseconds between frames
    #[arg(long, default_value = "16.0")]
    frame_ms: f64,

    /// Run at fast-forward speed
    #[arg(long)]
    fast: bool,

    /// Log a summary every N frames (0 disables)
    #[arg(long, default_value = "60")]
    summary_every: u32,

    /// Print the last rendered frame as JSON on exit
    #[arg(long)]
    dump: bool,
}

/// Counts lifecycle events and keeps the last frame.
#[derive(Default)]
struct SummarySink {
    spawned: u64,
    despawned: u64,
    last_frame: Option<RenderFrame>,
}

impl FrameSink for SummarySink {
    fn on_event(&mut self, event: &SimEvent) {
        match event {
            SimEvent::Spawned { entity, kind } => {
                self.spawned += 1;
                debug!(%entity, ?kind, "spawned");
            }
            SimEvent::Despawned { entity } => {
                self.despawned += 1;
                debug!(%entity, "despawned");
            }
        }
    }

    fn render(&mut self, frame: &RenderFrame) {
        self.last_frame = Some(frame.clone());
    }
}

/// Frame interval from `--frame-ms`. Negative, NaN and out-of-range values
/// are errors.
fn frame_duration(frame_ms: f64) -> Result<Duration, TryFromFloatSecsError> {
    Duration::try_from_secs_f64(frame_ms / 1000.0)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => {
            info!("Loading config from {:?}", path);
            SimConfig::from_json(&std::fs::read_to_string(path)?)?
        }
        None => world_setup::demo_config(),
    };

    let mut engine = SimulationEngine::new(config)?;
    let mut game_loop = GameLoop::new(LoopConfig::default());
    if args.fast {
        game_loop.toggle_fast();
    }

    let frame_time = frame_duration(args.frame_ms)?;
    let mut sink = SummarySink::default();
    let mut capped = 0u32;
    let mut discarded = 0u32;

    for frame in 1..=args.frames {
        let report = game_loop.frame(frame_time, &mut engine, &mut sink);
        match report.outcome {
            FrameOutcome::CatchUpCapped => capped += 1,
            FrameOutcome::LagDiscarded => discarded += 1,
            FrameOutcome::Rendered | FrameOutcome::Paused => {}
        }

        if args.summary_every > 0 && frame % args.summary_every == 0 {
            let components = engine.components();
            info!(
                frame,
                tick = engine.current_tick(),
                walkers = components.walk_intents.len(),
                queued = engine.queued_walkers(),
                missiles = components.missiles.len(),
                explosions = components.explosions.len(),
                trails = components.smoke_trails.len(),
                particles = components.smoke_particles.len(),
                "summary"
            );
        }
    }

    info!(
        ticks = engine.current_tick(),
        spawned = sink.spawned,
        despawned = sink.despawned,
        capped,
        discarded,
        "run complete"
    );

    if args.dump {
        if let Some(frame) = &sink.last_frame {
            println!("{}", serde_json::to_string_pretty(frame)?);
        }
    }

    Ok(())
}
