use crate::core::input::{LANE_COUNT, Lane};
use crate::error::{Error, Result};
use log::{debug, info};
use serde::Deserialize;
use smallvec::SmallVec;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const LEADERBOARD_FILE: &str = "leaderboard.json";

/// Which of the four lanes spawn a note at one timestamp. Bit 0 is lane 1.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct LaneMask(u8);

impl LaneMask {
    pub const EMPTY: Self = Self(0);

    pub fn from_lanes(lanes: &[Lane]) -> Self {
        Self(lanes.iter().fold(0, |acc, l| acc | (1 << l.index())))
    }

    #[inline(always)]
    pub const fn contains(self, lane: Lane) -> bool {
        self.0 & (1 << lane.index()) != 0
    }

    #[inline(always)]
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    #[inline(always)]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Set lanes in ascending order.
    pub fn lanes(self) -> SmallVec<[Lane; LANE_COUNT]> {
        Lane::ALL.iter().copied().filter(|l| self.contains(*l)).collect()
    }
}

impl FromStr for LaneMask {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.len() != LANE_COUNT {
            return Err(Error::InvalidLaneMask(s.to_string()));
        }
        let mut bits = 0u8;
        for (i, ch) in s.chars().enumerate() {
            match ch {
                '1' => bits |= 1 << i,
                '0' => {}
                _ => return Err(Error::InvalidLaneMask(s.to_string())),
            }
        }
        Ok(Self(bits))
    }
}

impl core::fmt::Display for LaneMask {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for lane in Lane::ALL {
            f.write_str(if self.contains(lane) { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// One playable difficulty. Immutable after loading.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Chart {
    pub title: String,
    pub artist: String,
    pub mapper: String,
    pub bpm: f64,
    pub difficulty: String,
    pub rating: f64,
    pub notes: BTreeMap<u64, LaneMask>,
    pub audio: PathBuf,
    pub background: PathBuf,
}

impl Chart {
    /// Bare chart around an already parsed timing map.
    pub fn from_notes<I>(notes: I) -> Self
    where
        I: IntoIterator<Item = (u64, LaneMask)>,
    {
        Self { notes: notes.into_iter().collect(), ..Self::default() }
    }

    /// Parses a `{"<ms>": "<mask>"}` map, failing on the first bad entry.
    pub fn parse_notes<'a, I>(raw: I) -> Result<BTreeMap<u64, LaneMask>>
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        let mut out = BTreeMap::new();
        for (ts, mask) in raw {
            let timestamp = ts
                .trim()
                .parse::<u64>()
                .map_err(|_| Error::InvalidTimestamp(ts.clone()))?;
            let mask = mask.parse::<LaneMask>()?;
            // Same timestamp written twice (e.g. "1000" and "01000"): merge lanes.
            let slot: &mut LaneMask = out.entry(timestamp).or_default();
            slot.0 |= mask.0;
        }
        Ok(out)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: RawDifficulty = serde_json::from_str(json)?;
        let notes = Self::parse_notes(raw.notes.iter())?;
        Ok(Self {
            title: raw.metadata.title,
            artist: raw.metadata.artist,
            mapper: raw.metadata.mapper,
            bpm: raw.metadata.bpm.to_f64("bpm")?,
            difficulty: raw.metadata.difficulty,
            rating: raw.metadata.rating.to_f64("rating")?,
            notes,
            audio: PathBuf::from(raw.general.audio),
            background: PathBuf::from(raw.general.background),
        })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut chart = Self::from_json_str(&content)?;
        if let Some(dir) = path.parent() {
            chart.audio = dir.join(&chart.audio);
            chart.background = dir.join(&chart.background);
        }
        debug!("Loaded chart {} with {} notes from {}", chart.display_name(), chart.note_count(), path.display());
        Ok(chart)
    }

    /// Latest chart timestamp, if any notes exist.
    #[inline(always)]
    pub fn last_timestamp(&self) -> Option<u64> {
        self.notes.last_key_value().map(|(ts, _)| *ts)
    }

    /// Total note count across all lanes.
    pub fn note_count(&self) -> usize {
        self.notes.values().map(|m| m.count() as usize).sum()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.notes.values().all(|m| m.is_empty())
    }

    pub fn display_name(&self) -> String {
        format!("{} - {} [{}]", self.artist, self.title, self.difficulty)
    }
}

/// Every difficulty found in one chart directory, easiest first.
#[derive(Clone, Debug, Default)]
pub struct ChartSet {
    pub root: PathBuf,
    pub difficulties: Vec<Chart>,
}

impl ChartSet {
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let root = dir.as_ref().to_path_buf();
        let mut difficulties = Vec::new();
        for entry in std::fs::read_dir(&root)? {
            let path = entry?.path();
            let is_json = path.extension().is_some_and(|e| e.eq_ignore_ascii_case("json"));
            let is_board = path.file_name().is_some_and(|n| n == LEADERBOARD_FILE);
            if is_json && !is_board {
                difficulties.push(Chart::load(&path)?);
            }
        }
        difficulties.sort_by(|a, b| a.rating.total_cmp(&b.rating));
        info!("Found {} difficulties in {}", difficulties.len(), root.display());
        Ok(Self { root, difficulties })
    }

    pub fn difficulty_names(&self) -> Vec<&str> {
        self.difficulties.iter().map(|d| d.difficulty.as_str()).collect()
    }

    /// Directory name, used as the leaderboard key.
    pub fn name(&self) -> String {
        self.root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

// --- On-disk difficulty layout ---

#[derive(Debug, Deserialize)]
struct RawDifficulty {
    metadata: RawMetadata,
    #[serde(default)]
    notes: HashMap<String, String>,
    general: RawGeneral,
}

#[derive(Debug, Deserialize)]
struct RawMetadata {
    #[serde(default)]
    title: String,
    #[serde(default)]
    artist: String,
    #[serde(default)]
    mapper: String,
    bpm: NumberOrString,
    #[serde(default)]
    difficulty: String,
    rating: NumberOrString,
}

#[derive(Debug, Deserialize)]
struct RawGeneral {
    #[serde(default)]
    audio: String,
    #[serde(default)]
    background: String,
}

// Converted charts store bpm and rating as strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

impl NumberOrString {
    fn to_f64(&self, field: &'static str) -> Result<f64> {
        match self {
            Self::Number(n) => Ok(*n),
            Self::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| Error::InvalidNumber { field, value: s.clone() }),
        }
    }
}
