use crate::core::input::Lane;

/// Hit-line anchor for a chart timestamp: half the reaction window early.
#[inline(always)]
pub fn nominal_timing(chart_timestamp_ms: u64, time_to_react_ms: u32) -> f64 {
    chart_timestamp_ms as f64 - f64::from(time_to_react_ms) / 2.0
}

/// Dimensionless approach progress. 1.0 is the hit line, below is early,
/// above is late.
#[inline(always)]
pub fn progress(
    nominal_timing: f64,
    clock_ms: i64,
    wait_before_playing_ms: i64,
    time_to_react_ms: u32,
) -> f64 {
    1.0 - ((nominal_timing + wait_before_playing_ms as f64 - clock_ms as f64)
        / f64::from(time_to_react_ms))
}

/// A spawned, unresolved note. Its position is derived from the clock on
/// demand; only the timing anchor is stored.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Note {
    pub lane: Lane,
    pub chart_timestamp: u64,
    pub nominal_timing: f64,
    pub clickable: bool,
}

impl Note {
    pub fn new(lane: Lane, chart_timestamp: u64, time_to_react_ms: u32) -> Self {
        Self {
            lane,
            chart_timestamp,
            nominal_timing: nominal_timing(chart_timestamp, time_to_react_ms),
            clickable: false,
        }
    }

    #[inline(always)]
    pub fn progress(&self, clock_ms: i64, wait_before_playing_ms: i64, time_to_react_ms: u32) -> f64 {
        progress(self.nominal_timing, clock_ms, wait_before_playing_ms, time_to_react_ms)
    }
}
