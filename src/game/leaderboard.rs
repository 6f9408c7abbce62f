use crate::error::Result;
use crate::game::chart::LEADERBOARD_FILE;
use crate::game::performance::Performance;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Serialize, Deserialize)]
struct BoardFile {
    #[serde(default)]
    scores: Vec<BoardEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct BoardEntry {
    id: usize,
    data: Performance,
}

/// Finished plays for one chart directory, stored beside its difficulties.
#[derive(Clone, Debug, Default)]
pub struct Leaderboard {
    path: PathBuf,
    performances: Vec<Performance>,
}

impl Leaderboard {
    pub fn file_path<P: AsRef<Path>>(chart_dir: P) -> PathBuf {
        chart_dir.as_ref().join(LEADERBOARD_FILE)
    }

    /// A missing file is an empty board. A malformed one is an error.
    pub fn load<P: AsRef<Path>>(chart_dir: P) -> Result<Self> {
        let path = Self::file_path(chart_dir);
        if !path.exists() {
            info!("No leaderboard at {}; starting empty.", path.display());
            return Ok(Self { path, performances: Vec::new() });
        }
        let content = std::fs::read_to_string(&path)?;
        let file: BoardFile = serde_json::from_str(&content)?;
        let mut scores = file.scores;
        scores.sort_by_key(|e| e.id);
        Ok(Self {
            path,
            performances: scores.into_iter().map(|e| e.data).collect(),
        })
    }

    /// `load`, downgrading a malformed file to an empty board.
    pub fn load_or_empty<P: AsRef<Path>>(chart_dir: P) -> Self {
        let chart_dir = chart_dir.as_ref();
        match Self::load(chart_dir) {
            Ok(board) => board,
            Err(e) => {
                warn!("Failed to read leaderboard in {}: {e}", chart_dir.display());
                Self { path: Self::file_path(chart_dir), performances: Vec::new() }
            }
        }
    }

    pub fn save(&self) -> Result<()> {
        let file = BoardFile {
            scores: self
                .performances
                .iter()
                .enumerate()
                .map(|(id, p)| BoardEntry { id, data: p.clone() })
                .collect(),
        };
        std::fs::write(&self.path, serde_json::to_string_pretty(&file)?)?;
        info!("Saved {} scores to {}", self.performances.len(), self.path.display());
        Ok(())
    }

    pub fn add(&mut self, performance: Performance) {
        self.performances.push(performance);
    }

    /// Removes the record at `index`, if present.
    pub fn remove(&mut self, index: usize) -> Option<Performance> {
        (index < self.performances.len()).then(|| self.performances.remove(index))
    }

    #[inline(always)]
    pub fn performances(&self) -> &[Performance] {
        &self.performances
    }

    #[inline(always)]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Highest score; the earliest record wins a tie.
    pub fn best(&self) -> Option<&Performance> {
        self.performances
            .iter()
            .reduce(|best, p| if p.score > best.score { p } else { best })
    }
}
