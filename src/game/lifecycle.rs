//! Note lifecycle: spawning chart rows as the clock reaches them, opening the
//! hit window, expiring notes that scroll past it, and handing notes out to
//! key presses.
//!
//! Every decision is a function of the clock value passed in, so the same
//! sequence of clock readings always produces the same state regardless of
//! how often `update` runs.

use crate::core::input::{LANE_COUNT, Lane};
use crate::error::Result;
use crate::game::chart::{Chart, LaneMask};
use crate::game::judgment::{CLICKABLE_PROGRESS, TIMEOUT_PROGRESS};
use crate::game::note::Note;
use log::debug;
use smallvec::SmallVec;

/// What one `update` call changed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    pub spawned: usize,
    pub became_clickable: usize,
    pub expired: SmallVec<[Note; LANE_COUNT]>,
}

impl TickReport {
    #[inline(always)]
    pub fn is_idle(&self) -> bool {
        self.spawned == 0 && self.became_clickable == 0 && self.expired.is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct NoteLifecycle {
    // Chart rows ascending by timestamp. Rows before `spawn_cursor` have spawned.
    schedule: Vec<(u64, LaneMask)>,
    spawn_cursor: usize,
    // Unresolved notes in spawn order.
    active: Vec<Note>,
    wait_before_playing_ms: i64,
}

impl NoteLifecycle {
    pub fn new(chart: &Chart, wait_before_playing_ms: i64) -> Self {
        let schedule = chart
            .notes
            .iter()
            .filter(|(_, mask)| !mask.is_empty())
            .map(|(ts, mask)| (*ts, *mask))
            .collect();
        Self {
            schedule,
            spawn_cursor: 0,
            active: Vec::with_capacity(64),
            wait_before_playing_ms,
        }
    }

    /// Drops every active note and rewinds the spawn schedule.
    pub fn reset(&mut self) {
        self.active.clear();
        self.spawn_cursor = 0;
    }

    #[inline(always)]
    pub fn active(&self) -> &[Note] {
        &self.active
    }

    #[inline(always)]
    pub fn spawned_rows(&self) -> usize {
        self.spawn_cursor
    }

    #[inline(always)]
    pub fn all_spawned(&self) -> bool {
        self.spawn_cursor >= self.schedule.len()
    }

    #[inline(always)]
    pub const fn wait_before_playing_ms(&self) -> i64 {
        self.wait_before_playing_ms
    }

    #[inline(always)]
    pub fn progress_of(&self, note: &Note, clock_ms: i64, time_to_react_ms: u32) -> f64 {
        note.progress(clock_ms, self.wait_before_playing_ms, time_to_react_ms)
    }

    /// Spawns one note per set lane for every row whose timestamp the clock
    /// has reached. Each row spawns exactly once.
    pub fn spawn_due(&mut self, clock_ms: i64, time_to_react_ms: u32) -> usize {
        let mut spawned = 0;
        while let Some(&(ts, mask)) = self.schedule.get(self.spawn_cursor) {
            if clock_ms < i64::try_from(ts).unwrap_or(i64::MAX) {
                break;
            }
            for lane in mask.lanes() {
                self.active.push(Note::new(lane, ts, time_to_react_ms));
                spawned += 1;
            }
            self.spawn_cursor += 1;
        }
        spawned
    }

    /// Per-tick step: spawn due rows, open hit windows, and expire notes that
    /// passed the outer band. Expired notes are returned so the caller can
    /// score them as misses.
    pub fn update(&mut self, clock_ms: i64, time_to_react_ms: u32) -> TickReport {
        let mut report = TickReport {
            spawned: self.spawn_due(clock_ms, time_to_react_ms),
            ..TickReport::default()
        };
        let wait = self.wait_before_playing_ms;
        self.active.retain_mut(|note| {
            let progress = note.progress(clock_ms, wait, time_to_react_ms);
            if progress >= CLICKABLE_PROGRESS && !note.clickable {
                note.clickable = true;
                report.became_clickable += 1;
            }
            if progress > TIMEOUT_PROGRESS {
                debug!(
                    "Timeout miss: lane={}, ts={}, progress={progress:.4}, clock={clock_ms}",
                    note.lane, note.chart_timestamp
                );
                report.expired.push(*note);
                return false;
            }
            true
        });
        report
    }

    /// Removes and returns the oldest clickable note in `lane`. A press with
    /// nothing clickable consumes nothing.
    pub fn destroy_on_hit(&mut self, lane: Lane) -> Option<Note> {
        let pos = self.active.iter().position(|n| n.lane == lane && n.clickable)?;
        Some(self.active.remove(pos))
    }

    /// `destroy_on_hit` for an untrusted lane number.
    pub fn destroy_on_hit_raw(&mut self, lane: u8) -> Result<Option<Note>> {
        let lane = Lane::try_from(lane)?;
        Ok(self.destroy_on_hit(lane))
    }
}
