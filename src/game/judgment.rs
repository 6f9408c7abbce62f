use serde::{Deserialize, Serialize};

use crate::core::input::Lane;

// Progress bands, symmetric around the hit line at 1.0. Boundary values
// belong to the tighter band.
pub const PERFECT_MIN: f64 = 0.9;
pub const PERFECT_MAX: f64 = 1.1;
pub const GOOD_MIN: f64 = 0.8;
pub const GOOD_MAX: f64 = 1.2;
pub const BAD_MIN: f64 = 0.7;
pub const BAD_MAX: f64 = 1.3;

/// A note becomes hittable once its progress reaches this value.
pub const CLICKABLE_PROGRESS: f64 = BAD_MIN;
/// Past this progress an unhit note is gone for good.
pub const TIMEOUT_PROGRESS: f64 = BAD_MAX;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    Perfect,
    Good,
    Bad,
    Miss,
}

impl Grade {
    /// Text shown to the player.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Perfect => "Perfect!",
            Self::Good => "Good!",
            Self::Bad => "Bad!",
            Self::Miss => "Miss!",
        }
    }

    /// Base points before the combo multiplier; doubles as the accuracy weight.
    pub const fn base_points(self) -> u64 {
        match self {
            Self::Perfect => 300,
            Self::Good => 100,
            Self::Bad => 50,
            Self::Miss => 0,
        }
    }

    #[inline(always)]
    pub const fn is_miss(self) -> bool {
        matches!(self, Self::Miss)
    }
}

impl core::fmt::Display for Grade {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// Maps a progress value to a grade. Total over f64: anything outside the
/// outer band, NaN included, is a Miss.
#[inline(always)]
pub fn grade_for_progress(progress: f64) -> Grade {
    if (PERFECT_MIN..=PERFECT_MAX).contains(&progress) {
        Grade::Perfect
    } else if (GOOD_MIN..=GOOD_MAX).contains(&progress) {
        Grade::Good
    } else if (BAD_MIN..=BAD_MAX).contains(&progress) {
        Grade::Bad
    } else {
        Grade::Miss
    }
}

/// Grade for a press that may or may not have consumed a note.
#[inline(always)]
pub fn grade_for_press(progress: Option<f64>) -> Grade {
    progress.map_or(Grade::Miss, grade_for_progress)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Judgment {
    pub lane: Lane,
    pub progress: f64,
    pub grade: Grade,
}

impl Judgment {
    pub fn new(lane: Lane, progress: f64) -> Self {
        Self { lane, progress, grade: grade_for_progress(progress) }
    }
}
