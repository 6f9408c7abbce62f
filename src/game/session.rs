//! One play of one chart: pre-roll, the per-tick lifecycle step, queued key
//! edges, and the end-of-chart condition.

use crate::config::Config;
use crate::core::clock::ClockSource;
use crate::core::input::{InputEdge, KeyEdge, Lane, LaneInput, lane_from_key};
use crate::game::chart::Chart;
use crate::game::judgment::{Grade, Judgment};
use crate::game::lifecycle::NoteLifecycle;
use crate::game::performance::Performance;
use crate::game::settings::clamp_time_to_react;
use log::{debug, info};
use std::collections::VecDeque;

const LOG_INTERVAL_MS: i64 = 1000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    PreRoll,
    Playing,
    Paused,
    Ended,
}

/// Transient judgement feedback shown over a lane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitFlash {
    pub lane: Lane,
    pub progress: f64,
    pub grade: Grade,
    /// RGBA from the configured grade palette.
    pub color: [u8; 4],
    pub judged_at_ms: i64,
}

#[derive(Debug)]
pub struct Session<C: ClockSource> {
    config: Config,
    chart: Chart,
    clock: C,
    lifecycle: NoteLifecycle,
    performance: Performance,
    time_to_react_ms: u32,
    input: LaneInput,
    pending_edges: VecDeque<InputEdge>,
    hit_flashes: Vec<HitFlash>,
    last_judgment: Option<Judgment>,
    preroll_elapsed_ms: i64,
    started: bool,
    paused: bool,
    ended: bool,
    log_timer_ms: i64,
}

impl<C: ClockSource> Session<C> {
    pub fn new(
        config: &Config,
        chart: Chart,
        clock: C,
        time_to_react_ms: u32,
        player_name: impl Into<String>,
    ) -> Self {
        let config = config.clone();
        let lifecycle = NoteLifecycle::new(&chart, config.wait_before_playing_ms);
        let performance = Performance::new(player_name);
        info!(
            "Session for {} ({} notes), time_to_react={}ms, player={}",
            chart.display_name(),
            chart.note_count(),
            time_to_react_ms,
            performance.player_name
        );
        Self {
            config,
            chart,
            clock,
            lifecycle,
            performance,
            time_to_react_ms: clamp_time_to_react(time_to_react_ms),
            input: LaneInput::new(),
            pending_edges: VecDeque::new(),
            hit_flashes: Vec::new(),
            last_judgment: None,
            preroll_elapsed_ms: 0,
            started: false,
            paused: false,
            ended: false,
            log_timer_ms: 0,
        }
    }

    #[inline(always)]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Hosts that drive their own clock (replays, tests) advance it here.
    #[inline(always)]
    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    #[inline(always)]
    pub fn chart(&self) -> &Chart {
        &self.chart
    }

    #[inline(always)]
    pub fn lifecycle(&self) -> &NoteLifecycle {
        &self.lifecycle
    }

    #[inline(always)]
    pub fn performance(&self) -> &Performance {
        &self.performance
    }

    #[inline(always)]
    pub const fn time_to_react_ms(&self) -> u32 {
        self.time_to_react_ms
    }

    /// Changes note speed mid-chart, clamped to 200..=600 ms. Notes already
    /// spawned keep the nominal timing they spawned with; only their window
    /// width follows the new value.
    pub fn set_time_to_react(&mut self, time_to_react_ms: u32) {
        self.time_to_react_ms = clamp_time_to_react(time_to_react_ms);
        debug!("time_to_react set to {}ms", self.time_to_react_ms);
    }

    #[inline(always)]
    pub fn hit_flashes(&self) -> &[HitFlash] {
        &self.hit_flashes
    }

    #[inline(always)]
    pub const fn last_judgment(&self) -> Option<Judgment> {
        self.last_judgment
    }

    #[inline(always)]
    pub const fn is_started(&self) -> bool {
        self.started
    }

    #[inline(always)]
    pub const fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn status(&self) -> SessionStatus {
        if self.ended {
            SessionStatus::Ended
        } else if self.paused {
            SessionStatus::Paused
        } else if self.started {
            SessionStatus::Playing
        } else {
            SessionStatus::PreRoll
        }
    }

    /// Queues a key edge for the next `update`. Dropped while paused or ended.
    pub fn queue_input(&mut self, edge: InputEdge) {
        if self.paused || self.ended {
            return;
        }
        self.pending_edges.push_back(edge);
    }

    /// Queues a keyboard key through the configured lane bindings. Returns
    /// false for keys bound to no lane.
    pub fn queue_key(&mut self, key: char, edge: KeyEdge) -> bool {
        match lane_from_key(key, &self.config.lane_keys) {
            Some(lane) => {
                self.queue_input(InputEdge { lane, edge });
                true
            }
            None => false,
        }
    }

    fn chart_over(&self, clock_ms: i64) -> bool {
        match self.chart.last_timestamp() {
            None => true,
            Some(last) => {
                clock_ms - self.config.end_of_chart_grace_ms > i64::try_from(last).unwrap_or(i64::MAX)
            }
        }
    }

    fn finish(&mut self, clock_ms: i64) {
        self.ended = true;
        self.pending_edges.clear();
        self.clock.pause();
        self.performance.finalize();
        info!(
            "Chart finished at {clock_ms}ms: score={}, max_combo={}, accuracy={:.2}",
            self.performance.score, self.performance.max_combo, self.performance.accuracy
        );
    }

    fn process_inputs(&mut self, clock_ms: i64) {
        while let Some(edge) = self.pending_edges.pop_front() {
            if !self.input.apply(edge) {
                continue;
            }
            let Some(note) = self.lifecycle.destroy_on_hit(edge.lane) else {
                continue;
            };
            let progress = self.lifecycle.progress_of(&note, clock_ms, self.time_to_react_ms);
            let judgment = Judgment::new(edge.lane, progress);
            self.performance.apply_judged(judgment.grade);
            self.hit_flashes.push(HitFlash {
                lane: judgment.lane,
                progress,
                grade: judgment.grade,
                color: self.config.grade_colors.for_grade(judgment.grade),
                judged_at_ms: clock_ms,
            });
            self.last_judgment = Some(judgment);
        }
    }

    /// Advances one tick. `delta_ms` only feeds pre-roll and the log timer;
    /// every timing decision reads the clock.
    pub fn update(&mut self, delta_ms: i64) -> SessionStatus {
        if self.ended {
            return SessionStatus::Ended;
        }
        if self.paused {
            return SessionStatus::Paused;
        }

        let clock_ms = self.clock.position_ms();
        if self.chart_over(clock_ms) {
            self.finish(clock_ms);
            return SessionStatus::Ended;
        }

        if !self.started {
            self.preroll_elapsed_ms += delta_ms.max(0);
            if self.preroll_elapsed_ms < self.config.wait_before_playing_ms {
                // No notes exist yet; edges only update held lanes.
                self.process_inputs(clock_ms);
                return SessionStatus::PreRoll;
            }
            self.started = true;
            self.clock.play();
            info!("Playback started after {}ms pre-roll", self.preroll_elapsed_ms);
        }

        let report = self.lifecycle.update(clock_ms, self.time_to_react_ms);
        for _ in &report.expired {
            self.performance.apply_timeout_miss();
        }
        self.process_inputs(clock_ms);

        let lifetime = self.config.hit_flash_lifetime_ms;
        self.hit_flashes.retain(|f| clock_ms - f.judged_at_ms < lifetime);

        self.log_timer_ms += delta_ms.max(0);
        if self.log_timer_ms >= LOG_INTERVAL_MS {
            info!(
                "Time: {clock_ms}ms, Combo: {}, Misses: {}, Active Notes: {}",
                self.performance.combo,
                self.performance.misses,
                self.lifecycle.active().len()
            );
            self.log_timer_ms -= LOG_INTERVAL_MS;
        }
        SessionStatus::Playing
    }

    pub fn pause(&mut self) {
        if self.paused || self.ended {
            return;
        }
        self.paused = true;
        if self.started {
            self.clock.pause();
        }
        self.input.release_all();
        self.pending_edges.clear();
        debug!("Paused at {}ms", self.clock.position_ms());
    }

    pub fn resume(&mut self) {
        if !self.paused {
            return;
        }
        self.paused = false;
        if self.started {
            self.clock.resume();
        }
        debug!("Resumed at {}ms", self.clock.position_ms());
    }

    /// Restarts the chart with a fresh performance for the same player.
    pub fn retry(&mut self) {
        let player = std::mem::take(&mut self.performance.player_name);
        self.performance = Performance::new(player);
        self.lifecycle.reset();
        self.input.release_all();
        self.pending_edges.clear();
        self.hit_flashes.clear();
        self.last_judgment = None;
        self.preroll_elapsed_ms = 0;
        self.started = false;
        self.paused = false;
        self.ended = false;
        self.log_timer_ms = 0;
        self.clock.restart();
        info!("Retrying {}", self.chart.display_name());
    }

    /// Leaves mid-chart. The performance is dropped, never recorded.
    pub fn abandon(self) {
        info!(
            "Abandoned {} at {}ms; discarding score {}",
            self.chart.display_name(),
            self.clock.position_ms(),
            self.performance.score
        );
    }

    /// The leaderboard record, available once the chart has ended.
    pub fn final_record(&self) -> Option<&Performance> {
        self.ended.then_some(&self.performance)
    }

    pub fn into_record(self) -> Option<Performance> {
        self.ended.then_some(self.performance)
    }
}
