use crate::error::Result;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const SETTINGS_PATH: &str = "settings.json";

pub const MIN_TIME_TO_REACT_MS: u32 = 200;
pub const MAX_TIME_TO_REACT_MS: u32 = 600;
pub const MIN_NOTE_SPEED: f64 = 0.5;
pub const MAX_NOTE_SPEED: f64 = 2.1;
const NOTE_SPEED_STEP: f64 = 0.1;
const PERCENT_STEP: u8 = 5;

/// Reaction window for a note speed: `round(725 - note_speed * 250)`,
/// kept within 200..=600 ms.
#[inline(always)]
pub fn time_to_react_for(note_speed: f64) -> u32 {
    let ms = (725.0 - note_speed * 10.0 * 25.0).round();
    clamp_time_to_react(ms.clamp(0.0, f64::from(u32::MAX)) as u32)
}

#[inline(always)]
pub const fn clamp_time_to_react(ms: u32) -> u32 {
    if ms < MIN_TIME_TO_REACT_MS {
        MIN_TIME_TO_REACT_MS
    } else if ms > MAX_TIME_TO_REACT_MS {
        MAX_TIME_TO_REACT_MS
    } else {
        ms
    }
}

#[inline(always)]
fn round_tenth(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Player-tunable options, persisted as JSON. `time_to_react` and
/// `background_alpha` are derived and never stored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub username: String,
    note_speed: f64,
    background_dim: u8,
    volume: u8,
    #[serde(skip)]
    time_to_react: u32,
    #[serde(skip)]
    background_alpha: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self::new(String::new(), 1.0, 0, 100)
    }
}

impl Settings {
    pub fn new(username: String, note_speed: f64, background_dim: u8, volume: u8) -> Self {
        let mut s = Self {
            username,
            note_speed: round_tenth(note_speed.clamp(MIN_NOTE_SPEED, MAX_NOTE_SPEED)),
            background_dim: background_dim.min(100),
            volume: volume.min(100),
            time_to_react: 0,
            background_alpha: 0,
        };
        s.recompute();
        s
    }

    fn recompute(&mut self) {
        self.time_to_react = time_to_react_for(self.note_speed);
        self.background_alpha = (f64::from(self.background_dim) * 2.55).round() as u8;
    }

    #[inline(always)]
    pub const fn note_speed(&self) -> f64 {
        self.note_speed
    }

    #[inline(always)]
    pub const fn time_to_react(&self) -> u32 {
        self.time_to_react
    }

    #[inline(always)]
    pub const fn background_dim(&self) -> u8 {
        self.background_dim
    }

    #[inline(always)]
    pub const fn background_alpha(&self) -> u8 {
        self.background_alpha
    }

    #[inline(always)]
    pub const fn volume(&self) -> u8 {
        self.volume
    }

    pub fn increment_note_speed(&mut self) {
        if self.time_to_react > MIN_TIME_TO_REACT_MS {
            self.note_speed = round_tenth(self.note_speed + NOTE_SPEED_STEP);
            self.recompute();
        }
    }

    pub fn decrement_note_speed(&mut self) {
        if self.time_to_react < MAX_TIME_TO_REACT_MS {
            self.note_speed = round_tenth(self.note_speed - NOTE_SPEED_STEP);
            self.recompute();
        }
    }

    pub fn increment_background_dim(&mut self) {
        if self.background_dim < 100 {
            self.background_dim = (self.background_dim + PERCENT_STEP).min(100);
            self.recompute();
        }
    }

    pub fn decrement_background_dim(&mut self) {
        if self.background_dim > 0 {
            self.background_dim = self.background_dim.saturating_sub(PERCENT_STEP);
            self.recompute();
        }
    }

    pub fn increment_volume(&mut self) {
        if self.volume < 100 {
            self.volume = (self.volume + PERCENT_STEP).min(100);
        }
    }

    pub fn decrement_volume(&mut self) {
        self.volume = self.volume.saturating_sub(PERCENT_STEP);
    }

    /// Volume as the 0.0..=1.0 gain audio backends expect.
    #[inline(always)]
    pub fn volume_gain(&self) -> f32 {
        f32::from(self.volume) / 100.0
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let raw: Self = serde_json::from_str(&content)?;
        Ok(Self::new(raw.username, raw.note_speed, raw.background_dim, raw.volume))
    }

    /// Loads settings, falling back to defaults when the file is absent or unreadable.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!("No settings at {}; using defaults.", path.display());
            return Self::default();
        }
        match Self::load(path) {
            Ok(s) => s,
            Err(e) => {
                warn!("Failed to load settings from {}: {e}", path.display());
                Self::default()
            }
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
