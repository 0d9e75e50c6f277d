//! Fixed-step host loop with a lag accumulator.
//!
//! The host calls `GameLoop::frame` once per rendered frame with the real
//! time elapsed since the previous call. Elapsed time accumulates as lag;
//! each full update interval of lag runs one engine tick. The leftover
//! fraction of an interval becomes the render interpolation fraction.

use std::time::Duration;

use tracing::{debug, warn};

use tower_defense_core::config::LoopConfig;
use tower_defense_core::constants::FAST_GAME_SPEED;
use tower_defense_core::events::SimEvent;
use tower_defense_core::state::RenderFrame;

use crate::engine::SimulationEngine;

/// Slowest and fastest accepted speed multipliers.
const MIN_SPEED: f64 = 0.1;
const MAX_SPEED: f64 = 8.0;

/// Rendering collaborator driven by the loop.
pub trait FrameSink {
    /// Called for every lifecycle event, in order, right after its tick.
    fn on_event(&mut self, _event: &SimEvent) {}

    /// Called at most once per frame.
    fn render(&mut self, frame: &RenderFrame);
}

/// How a frame ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Ticks (possibly none) ran and the frame was rendered with the
    /// leftover fraction.
    Rendered,
    /// The per-frame tick cap was hit; rendered at fraction 1 with lag left over.
    CatchUpCapped,
    /// Lag had grown past what the cap could absorb and was dropped.
    /// Nothing ran and nothing was rendered.
    LagDiscarded,
    /// Paused: no ticks, rendered at fraction 0.
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub ticks: u32,
    pub interpolation: f32,
    pub outcome: FrameOutcome,
}

/// Lag-accumulator loop state. Owns no simulation state.
#[derive(Debug, Clone)]
pub struct GameLoop {
    config: LoopConfig,
    lag_ms: f64,
    speed: f64,
    paused: bool,
}

impl GameLoop {
    pub fn new(config: LoopConfig) -> Self {
        Self {
            config,
            lag_ms: 0.0,
            speed: 1.0,
            paused: false,
        }
    }

    /// Real milliseconds per tick at the current speed.
    pub fn ms_per_update(&self) -> f64 {
        self.config.ms_per_update / self.speed
    }

    pub fn lag_ms(&self) -> f64 {
        self.lag_ms
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.speed = if speed.is_finite() {
            speed.clamp(MIN_SPEED, MAX_SPEED)
        } else {
            1.0
        };
        debug!(speed = self.speed, "game speed changed");
    }

    /// Switch between normal and fast-forward.
    pub fn toggle_fast(&mut self) {
        if self.speed > 1.0 {
            self.set_speed(1.0);
        } else {
            self.set_speed(FAST_GAME_SPEED);
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume from a pause. Time spent paused is not caught up.
    pub fn resume(&mut self) {
        self.paused = false;
        self.lag_ms = 0.0;
    }

    /// Advance by `elapsed` real time: run due ticks, forward their events to
    /// the sink, and render once.
    pub fn frame<S: FrameSink>(
        &mut self,
        elapsed: Duration,
        engine: &mut SimulationEngine,
        sink: &mut S,
    ) -> FrameReport {
        if self.paused {
            sink.render(&engine.render_frame(0.0));
            return FrameReport {
                ticks: 0,
                interpolation: 0.0,
                outcome: FrameOutcome::Paused,
            };
        }

        self.lag_ms += elapsed.as_secs_f64() * 1000.0;

        let max_updates = self.config.max_updates_per_frame;
        let stall_ms = self.config.ms_per_update * f64::from(max_updates);
        if self.lag_ms > stall_ms {
            warn!(lag_ms = self.lag_ms, "discarding lag after stall");
            self.lag_ms = 0.0;
            return FrameReport {
                ticks: 0,
                interpolation: 0.0,
                outcome: FrameOutcome::LagDiscarded,
            };
        }

        let interval = self.ms_per_update();
        let mut ticks = 0;
        while self.lag_ms >= interval {
            let snapshot = engine.tick();
            for event in &snapshot.events {
                sink.on_event(event);
            }
            ticks += 1;
            self.lag_ms -= interval;

            if ticks > max_updates {
                debug!(ticks, lag_ms = self.lag_ms, "catch-up cap reached");
                sink.render(&engine.render_frame(1.0));
                return FrameReport {
                    ticks,
                    interpolation: 1.0,
                    outcome: FrameOutcome::CatchUpCapped,
                };
            }
        }

        let interpolation = (self.lag_ms / interval) as f32;
        sink.render(&engine.render_frame(interpolation));
        FrameReport {
            ticks,
            interpolation,
            outcome: FrameOutcome::Rendered,
        }
    }
}

impl Default for GameLoop {
    fn default() -> Self {
        Self::new(LoopConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use tower_defense_core::config::SimConfig;
    use tower_defense_core::constants::MAX_UPDATES_PER_FRAME;

    #[derive(Default)]
    struct RecordingSink {
        events: Vec<SimEvent>,
        frames: Vec<RenderFrame>,
    }

    impl FrameSink for RecordingSink {
        fn on_event(&mut self, event: &SimEvent) {
            self.events.push(*event);
        }

        fn render(&mut self, frame: &RenderFrame) {
            self.frames.push(frame.clone());
        }
    }

    fn engine() -> SimulationEngine {
        SimulationEngine::new(SimConfig::default()).unwrap()
    }

    #[test]
    fn test_leftover_lag_becomes_interpolation() {
        let mut game_loop = GameLoop::default();
        let mut engine = engine();
        let mut sink = RecordingSink::default();

        let report = game_loop.frame(Duration::from_millis(25), &mut engine, &mut sink);

        assert_eq!(report.ticks, 1);
        assert_eq!(report.outcome, FrameOutcome::Rendered);
        assert_abs_diff_eq!(report.interpolation, 0.5, epsilon = 1e-3);
        assert_eq!(sink.frames.len(), 1);
        assert_eq!(sink.frames[0].tick, 1);
        assert!(report.interpolation >= 0.0 && report.interpolation < 1.0);
    }

    #[test]
    fn test_short_frame_runs_no_ticks() {
        let mut game_loop = GameLoop::default();
        let mut engine = engine();
        let mut sink = RecordingSink::default();

        let report = game_loop.frame(Duration::from_millis(5), &mut engine, &mut sink);
        assert_eq!(report.ticks, 0);
        assert_eq!(engine.current_tick(), 0);
        assert_eq!(sink.frames.len(), 1);

        // Lag carries over to the next frame.
        let report = game_loop.frame(Duration::from_millis(12), &mut engine, &mut sink);
        assert_eq!(report.ticks, 1);
    }

    #[test]
    fn test_stall_discards_lag() {
        let mut game_loop = GameLoop::default();
        let mut engine = engine();
        let mut sink = RecordingSink::default();

        let report = game_loop.frame(Duration::from_millis(500), &mut engine, &mut sink);

        assert_eq!(report.outcome, FrameOutcome::LagDiscarded);
        assert_eq!(report.ticks, 0);
        assert_eq!(game_loop.lag_ms(), 0.0);
        assert_eq!(engine.current_tick(), 0);
        assert!(sink.frames.is_empty());
    }

    #[test]
    fn test_catch_up_is_capped() {
        let mut game_loop = GameLoop::default();
        game_loop.set_speed(FAST_GAME_SPEED);
        let mut engine = engine();
        let mut sink = RecordingSink::default();

        let report = game_loop.frame(Duration::from_millis(100), &mut engine, &mut sink);

        assert_eq!(report.outcome, FrameOutcome::CatchUpCapped);
        assert_eq!(report.ticks, MAX_UPDATES_PER_FRAME + 1);
        assert_eq!(report.interpolation, 1.0);
        assert_eq!(sink.frames.len(), 1);
        assert!(game_loop.lag_ms() > 0.0);
    }

    #[test]
    fn test_fast_speed_divides_interval() {
        let mut game_loop = GameLoop::default();
        let base = game_loop.ms_per_update();
        game_loop.toggle_fast();
        assert_abs_diff_eq!(game_loop.ms_per_update(), base / 3.0, epsilon = 1e-9);
        game_loop.toggle_fast();
        assert_abs_diff_eq!(game_loop.ms_per_update(), base, epsilon = 1e-9);

        game_loop.set_speed(0.0);
        assert_eq!(game_loop.speed(), MIN_SPEED);
    }

    #[test]
    fn test_paused_renders_at_zero() {
        let mut game_loop = GameLoop::default();
        let mut engine = engine();
        let mut sink = RecordingSink::default();
        game_loop.pause();

        let report = game_loop.frame(Duration::from_millis(50), &mut engine, &mut sink);
        assert_eq!(report.outcome, FrameOutcome::Paused);
        assert_eq!(report.ticks, 0);
        assert_eq!(sink.frames[0].interpolation, 0.0);
        assert_eq!(engine.current_tick(), 0);

        game_loop.resume();
        let report = game_loop.frame(Duration::from_millis(20), &mut engine, &mut sink);
        assert_eq!(report.ticks, 1);
    }

    #[test]
    fn test_events_reach_the_sink() {
        let mut game_loop = GameLoop::default();
        let mut engine = SimulationEngine::demo().unwrap();
        let mut sink = RecordingSink::default();

        game_loop.frame(Duration::from_millis(17), &mut engine, &mut sink);

        let spawned = sink
            .events
            .iter()
            .filter(|e| matches!(e, SimEvent::Spawned { .. }))
            .count();
        // 4 walkers, 2 missile towers, 2 swallow towers with their swallows,
        // the first pair of wave walkers, and the first missile launch with
        // its trails.
        assert_eq!(spawned, 4 + 2 + 4 + 2 + 2 * 4);
    }
}
