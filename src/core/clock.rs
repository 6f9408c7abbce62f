//! Playback clocks. The playback position is the only time source gameplay
//! reads; wall-clock timers never drive judging.

use std::time::{Duration, Instant};

/// Song position provider. Implementations must report a monotonic position
/// while playing and freeze it while paused.
pub trait ClockSource {
    /// Milliseconds since song start.
    fn position_ms(&self) -> i64;
    fn play(&mut self);
    fn pause(&mut self);
    fn resume(&mut self);
    /// Stops playback and rewinds to zero.
    fn restart(&mut self);
    fn is_playing(&self) -> bool;
}

/// Deterministic clock advanced by its owner. Used for replays and tests.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    position_ms: i64,
    playing: bool,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the position forward, but only while playing.
    pub fn advance(&mut self, delta_ms: i64) {
        if self.playing {
            self.position_ms = self.position_ms.saturating_add(delta_ms.max(0));
        }
    }

    pub fn set_position(&mut self, position_ms: i64) {
        self.position_ms = position_ms;
    }
}

impl ClockSource for ManualClock {
    fn position_ms(&self) -> i64 {
        self.position_ms
    }

    fn play(&mut self) {
        self.playing = true;
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn resume(&mut self) {
        self.playing = true;
    }

    fn restart(&mut self) {
        self.position_ms = 0;
        self.playing = false;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }
}

/// Wall-clock backed playback position for hosts without an audio device clock.
#[derive(Debug, Clone, Default)]
pub struct SystemClock {
    started_at: Option<Instant>,
    banked: Duration,
}

impl SystemClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClockSource for SystemClock {
    fn position_ms(&self) -> i64 {
        let running = self.started_at.map_or(Duration::ZERO, |t| t.elapsed());
        (self.banked + running).as_millis() as i64
    }

    fn play(&mut self) {
        self.banked = Duration::ZERO;
        self.started_at = Some(Instant::now());
    }

    fn pause(&mut self) {
        if let Some(t) = self.started_at.take() {
            self.banked += t.elapsed();
        }
    }

    fn resume(&mut self) {
        if self.started_at.is_none() {
            self.started_at = Some(Instant::now());
        }
    }

    fn restart(&mut self) {
        self.started_at = None;
        self.banked = Duration::ZERO;
    }

    fn is_playing(&self) -> bool {
        self.started_at.is_some()
    }
}
