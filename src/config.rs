use crate::core::input::LANE_COUNT;
use crate::game::judgment::Grade;
use crate::game::settings::MAX_TIME_TO_REACT_MS;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

pub const CONFIG_PATH: &str = "koli-rhythm.json";

// Pre-roll applied before the song starts; also part of the progress formula.
pub const WAIT_BEFORE_PLAYING_MS: i64 = 1000;
// Play continues this long past the last chart timestamp.
pub const END_OF_CHART_GRACE_MS: i64 = 3000;
pub const HIT_FLASH_LIFETIME_MS: i64 = 400;
// Shorter pre-rolls spawn notes already inside the hit window at the slowest
// note speed: spawn progress is 1.5 - wait / time_to_react.
pub const MIN_WAIT_BEFORE_PLAYING_MS: i64 = MAX_TIME_TO_REACT_MS as i64 * 4 / 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LogLevel {
    Off,
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    const fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "Off",
            Self::Error => "Error",
            Self::Warn => "Warn",
            Self::Info => "Info",
            Self::Debug => "Debug",
            Self::Trace => "Trace",
        }
    }

    pub const fn as_level_filter(self) -> log::LevelFilter {
        match self {
            Self::Off => log::LevelFilter::Off,
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" => Ok(Self::Off),
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            other => Err(format!("'{other}' is not a valid log level")),
        }
    }
}

impl TryFrom<String> for LogLevel {
    type Error = String;

    fn try_from(value: String) -> Result<Self, String> {
        value.parse()
    }
}

impl From<LogLevel> for String {
    fn from(level: LogLevel) -> Self {
        level.as_str().to_string()
    }
}

/// RGBA per grade, used by hosts to tint hit flashes and grade text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeColors {
    pub perfect: [u8; 4],
    pub good: [u8; 4],
    pub bad: [u8; 4],
    pub miss: [u8; 4],
}

impl Default for GradeColors {
    fn default() -> Self {
        Self {
            perfect: [104, 158, 227, 255],
            good: [124, 208, 139, 255],
            bad: [227, 158, 104, 255],
            miss: [227, 111, 105, 255],
        }
    }
}

impl GradeColors {
    #[inline(always)]
    pub const fn for_grade(&self, grade: Grade) -> [u8; 4] {
        match grade {
            Grade::Perfect => self.perfect,
            Grade::Good => self.good,
            Grade::Bad => self.bad,
            Grade::Miss => self.miss,
        }
    }
}

/// Engine constants. Built once at startup and handed to sessions by reference;
/// nothing mutates it afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub wait_before_playing_ms: i64,
    pub end_of_chart_grace_ms: i64,
    pub hit_flash_lifetime_ms: i64,
    pub log_level: LogLevel,
    pub lane_keys: [char; LANE_COUNT],
    pub grade_colors: GradeColors,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            wait_before_playing_ms: WAIT_BEFORE_PLAYING_MS,
            end_of_chart_grace_ms: END_OF_CHART_GRACE_MS,
            hit_flash_lifetime_ms: HIT_FLASH_LIFETIME_MS,
            log_level: LogLevel::default(),
            lane_keys: ['d', 'f', 'j', 'k'],
            grade_colors: GradeColors::default(),
        }
    }
}

impl Config {
    /// Reads a JSON config, falling back to defaults for a missing or malformed
    /// file and for any missing key.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                info!("No config at {} ({e}); using defaults.", path.display());
                return Self::default();
            }
        };
        match serde_json::from_str::<Self>(&content) {
            Ok(cfg) => cfg.sanitized(),
            Err(e) => {
                warn!("Failed to parse config {}: {e}; using defaults.", path.display());
                Self::default()
            }
        }
    }

    fn sanitized(mut self) -> Self {
        let default = Self::default();
        if self.wait_before_playing_ms < MIN_WAIT_BEFORE_PLAYING_MS {
            warn!(
                "wait_before_playing_ms {} is below {MIN_WAIT_BEFORE_PLAYING_MS}; using {}",
                self.wait_before_playing_ms, default.wait_before_playing_ms
            );
            self.wait_before_playing_ms = default.wait_before_playing_ms;
        }
        if self.end_of_chart_grace_ms < 0 {
            self.end_of_chart_grace_ms = default.end_of_chart_grace_ms;
        }
        if self.hit_flash_lifetime_ms < 0 {
            self.hit_flash_lifetime_ms = default.hit_flash_lifetime_ms;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = Config::load(dir.path().join("nope.json"));
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.wait_before_playing_ms, 1000);
        assert_eq!(cfg.end_of_chart_grace_ms, 3000);
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_keys() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cfg.json");
        let mut f = std::fs::File::create(&path).expect("create");
        write!(f, r#"{{"log_level": "debug", "lane_keys": ["a","s","k","l"]}}"#).expect("write");
        let cfg = Config::load(&path);
        assert_eq!(cfg.log_level, LogLevel::Debug);
        assert_eq!(cfg.lane_keys, ['a', 's', 'k', 'l']);
        assert_eq!(cfg.wait_before_playing_ms, WAIT_BEFORE_PLAYING_MS);
    }

    #[test]
    fn malformed_file_falls_back() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cfg.json");
        std::fs::write(&path, "{ not json").expect("write");
        assert_eq!(Config::load(&path), Config::default());
    }

    #[test]
    fn negative_durations_are_reset() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cfg.json");
        std::fs::write(&path, r#"{"wait_before_playing_ms": -5}"#).expect("write");
        assert_eq!(Config::load(&path).wait_before_playing_ms, WAIT_BEFORE_PLAYING_MS);
    }

    #[test]
    fn short_preroll_is_reset() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cfg.json");
        std::fs::write(&path, r#"{"wait_before_playing_ms": 0}"#).expect("write");
        assert_eq!(Config::load(&path).wait_before_playing_ms, WAIT_BEFORE_PLAYING_MS);
        std::fs::write(&path, r#"{"wait_before_playing_ms": 479}"#).expect("write");
        assert_eq!(Config::load(&path).wait_before_playing_ms, WAIT_BEFORE_PLAYING_MS);
        std::fs::write(&path, r#"{"wait_before_playing_ms": 480}"#).expect("write");
        assert_eq!(Config::load(&path).wait_before_playing_ms, 480);
    }

    #[test]
    fn log_level_deserializes_from_string() {
        assert_eq!(LogLevel::try_from("Info".to_string()), Ok(LogLevel::Info));
        let cfg: Config = serde_json::from_str(r#"{"log_level": "trace"}"#).expect("config");
        assert_eq!(cfg.log_level, LogLevel::Trace);
        assert!(serde_json::from_str::<Config>(r#"{"log_level": "loud"}"#).is_err());
    }

    #[test]
    fn log_level_parses_loosely() {
        assert_eq!("WARNING".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert!("loud".parse::<LogLevel>().is_err());
        assert_eq!(LogLevel::Trace.as_level_filter(), log::LevelFilter::Trace);
    }
}
