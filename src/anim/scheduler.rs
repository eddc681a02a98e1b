//! Animation scheduling.
//!
//! The scheduler owns the active backdrop variant and its RNG, decides when
//! the next simulation tick is due, and performs the full synchronous
//! reseed on viewport resize. It never draws; the main loop asks it for
//! frame snapshots and hands them to the renderer.

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use super::{Backdrop, BackdropKind, CharRain, CircuitBoard, Frame, Viewport};

/// Drives one backdrop variant at a fixed tick cadence.
pub struct AnimationScheduler {
    backdrop: Box<dyn Backdrop>,
    viewport: Viewport,
    rng: StdRng,
    frame_interval: Duration,
    last_tick: Instant,
    rain_pool: usize,
}

impl AnimationScheduler {
    /// Create a scheduler and seed the chosen variant for `viewport`.
    pub fn new(kind: BackdropKind, fps: u32, rain_pool: usize, viewport: Viewport, now: Instant) -> Self {
        Self::with_rng(kind, fps, rain_pool, viewport, now, StdRng::from_entropy())
    }

    /// As `new`, but with a caller-supplied RNG for deterministic tests.
    pub fn with_rng(
        kind: BackdropKind,
        fps: u32,
        rain_pool: usize,
        viewport: Viewport,
        now: Instant,
        mut rng: StdRng,
    ) -> Self {
        let mut backdrop = build_backdrop(kind, rain_pool);
        backdrop.reseed(viewport, &mut rng);
        Self {
            backdrop,
            viewport,
            rng,
            frame_interval: interval_for(fps),
            last_tick: now,
            rain_pool,
        }
    }

    pub fn kind(&self) -> BackdropKind {
        self.backdrop.kind()
    }

    pub fn population(&self) -> usize {
        self.backdrop.population()
    }

    #[allow(dead_code)]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Discard the store and reseed for the new dimensions. Last resize
    /// wins; there is no partial carryover of element state.
    pub fn handle_resize(&mut self, cols: u16, rows: u16) {
        self.viewport = Viewport::new(cols, rows);
        self.backdrop.reseed(self.viewport, &mut self.rng);
        info!(
            "backdrop reseeded: {} {}x{}, population {}",
            self.kind().name(),
            cols,
            rows,
            self.population()
        );
    }

    /// Swap in the other variant and seed it for the current viewport.
    pub fn toggle(&mut self) -> BackdropKind {
        let kind = self.kind().toggled();
        self.backdrop = build_backdrop(kind, self.rain_pool);
        self.backdrop.reseed(self.viewport, &mut self.rng);
        info!("backdrop switched to {}", kind.name());
        kind
    }

    /// True once a full frame interval has elapsed since the last tick.
    pub fn frame_due(&self, now: Instant) -> bool {
        now.duration_since(self.last_tick) >= self.frame_interval
    }

    /// Time remaining until the next tick, used as the event-poll timeout.
    pub fn time_until_frame(&self, now: Instant) -> Duration {
        let next = self.last_tick + self.frame_interval;
        next.saturating_duration_since(now)
    }

    /// Advance the simulation by one step. The caller redraws afterwards;
    /// advancement always completes before that redraw is requested.
    pub fn tick(&mut self, now: Instant) {
        self.backdrop.advance(&mut self.rng);
        self.last_tick = now;
    }

    pub fn frame(&self) -> Frame {
        self.backdrop.frame()
    }
}

fn build_backdrop(kind: BackdropKind, rain_pool: usize) -> Box<dyn Backdrop> {
    match kind {
        BackdropKind::Rain => Box::new(CharRain::new(rain_pool)),
        BackdropKind::Circuit => Box::new(CircuitBoard::new()),
    }
}

fn interval_for(fps: u32) -> Duration {
    Duration::from_millis(1000 / u64::from(fps.max(1)))
}
