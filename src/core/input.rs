use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const LANE_COUNT: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Lane {
    First = 1,
    Second = 2,
    Third = 3,
    Fourth = 4,
}

impl Lane {
    pub const ALL: [Lane; LANE_COUNT] = [Lane::First, Lane::Second, Lane::Third, Lane::Fourth];

    /// 1-based lane number as written in charts and shown to players.
    #[inline(always)]
    pub const fn number(self) -> u8 {
        self as u8
    }

    /// 0-based slot for per-lane arrays.
    #[inline(always)]
    pub const fn index(self) -> usize {
        self as usize - 1
    }
}

impl TryFrom<u8> for Lane {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(Lane::First),
            2 => Ok(Lane::Second),
            3 => Ok(Lane::Third),
            4 => Ok(Lane::Fourth),
            other => Err(Error::InvalidLane(other)),
        }
    }
}

impl core::fmt::Display for Lane {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.number())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyEdge {
    Down,
    Up,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InputEdge {
    pub lane: Lane,
    pub edge: KeyEdge,
}

impl InputEdge {
    #[inline(always)]
    pub const fn down(lane: Lane) -> Self {
        Self { lane, edge: KeyEdge::Down }
    }

    #[inline(always)]
    pub const fn up(lane: Lane) -> Self {
        Self { lane, edge: KeyEdge::Up }
    }

    /// Builds an edge from an untrusted lane number, rejecting anything outside 1..=4.
    pub fn from_raw(lane: u8, edge: KeyEdge) -> Result<Self> {
        Ok(Self { lane: Lane::try_from(lane)?, edge })
    }
}

/// Edge-triggered lane state. A held lane ignores repeated downs until released,
/// so a single hold can never consume more than one note.
#[derive(Clone, Debug, Default)]
pub struct LaneInput {
    held: [bool; LANE_COUNT],
}

impl LaneInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies an edge and reports whether it is a fresh key-down.
    pub fn apply(&mut self, ev: InputEdge) -> bool {
        let slot = &mut self.held[ev.lane.index()];
        match ev.edge {
            KeyEdge::Down if *slot => false,
            KeyEdge::Down => {
                *slot = true;
                true
            }
            KeyEdge::Up => {
                *slot = false;
                false
            }
        }
    }

    #[inline(always)]
    pub fn is_held(&self, lane: Lane) -> bool {
        self.held[lane.index()]
    }

    pub fn release_all(&mut self) {
        self.held = [false; LANE_COUNT];
    }
}

#[inline(always)]
pub fn lane_from_key(key: char, lane_keys: &[char; LANE_COUNT]) -> Option<Lane> {
    let key = key.to_ascii_lowercase();
    lane_keys
        .iter()
        .position(|k| k.to_ascii_lowercase() == key)
        .map(|i| Lane::ALL[i])
}
