//! High score leaderboard system
//!
//! Persisted to LocalStorage, tracks top 10 scores.

use serde::{Deserialize, Serialize};

use crate::platform::storage;
use crate::sim::GameState;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Player's score
    pub score: u64,
    /// Longest rhythm combo in the run
    pub max_combo: u32,
    /// Lost Data fragments recovered in the run
    pub fragments: u32,
    /// Run ended with the boss defeated
    #[serde(default)]
    pub victory: bool,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

impl HighScoreEntry {
    /// Summarize a finished run
    pub fn from_run(state: &GameState, timestamp: f64) -> Self {
        Self {
            score: state.score,
            max_combo: state.rhythm.max_combo,
            fragments: state.fragments_collected() as u32,
            victory: state.phase == crate::sim::GamePhase::Victory,
            timestamp,
        }
    }
}

/// High score leaderboard
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    const STORAGE_KEY: &'static str = "barcode_highscores";

    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Check if score beats the lowest entry
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Add an entry to the leaderboard (if it qualifies)
    /// Returns the rank achieved (1-indexed) or None if didn't qualify
    pub fn add(&mut self, entry: HighScoreEntry) -> Option<usize> {
        if !self.qualifies(entry.score) {
            return None;
        }

        // Find insertion point (sorted descending by score, ties keep the older entry first)
        let pos = self.entries.iter().position(|e| entry.score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        // Trim to max size
        self.entries.truncate(MAX_HIGH_SCORES);

        Some(rank)
    }

    /// Record a finished run
    pub fn record_run(&mut self, state: &GameState, timestamp: f64) -> Option<usize> {
        let rank = self.add(HighScoreEntry::from_run(state, timestamp));
        if let Some(rank) = rank {
            log::info!("New high score #{}: {}", rank, state.score);
        }
        rank
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Load high scores from LocalStorage
    pub fn load() -> Self {
        match storage::load_json::<HighScores>(Self::STORAGE_KEY) {
            Ok(mut scores) => {
                scores.entries.sort_by(|a, b| b.score.cmp(&a.score));
                scores.entries.truncate(MAX_HIGH_SCORES);
                log::info!("Loaded {} high scores", scores.entries.len());
                scores
            }
            Err(crate::persistence::PersistError::Missing) => {
                log::info!("No high scores found, starting fresh");
                Self::new()
            }
            Err(e) => {
                log::warn!("High scores unreadable ({}), starting fresh", e);
                Self::new()
            }
        }
    }

    /// Save high scores to LocalStorage
    pub fn save(&self) {
        match storage::save_json(Self::STORAGE_KEY, self) {
            Ok(()) => log::info!("High scores saved ({} entries)", self.entries.len()),
            Err(e) => log::warn!("Failed to save high scores: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(score: u64) -> HighScoreEntry {
        HighScoreEntry {
            score,
            max_combo: 0,
            fragments: 0,
            victory: false,
            timestamp: 0.0,
        }
    }

    #[test]
    fn test_sorted_and_capped() {
        let mut scores = HighScores::new();
        for s in [500, 100, 900, 300, 700, 200, 800, 400, 600, 1000, 50] {
            scores.add(entry(s));
        }
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(scores.top_score(), Some(1000));
        assert!(scores.entries.windows(2).all(|w| w[0].score >= w[1].score));
        assert!(!scores.qualifies(50));
        assert!(!scores.qualifies(100));
        assert!(scores.qualifies(150));
    }

    #[test]
    fn test_zero_never_qualifies() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add(entry(0)), None);
        assert!(scores.is_empty());
    }

    #[test]
    fn test_ranks_reported() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add(entry(300)), Some(1));
        assert_eq!(scores.add(entry(100)), Some(2));
        assert_eq!(scores.add(entry(200)), Some(2));
        assert_eq!(scores.add(entry(200)), Some(3), "ties rank below existing");
    }

    #[test]
    fn test_record_run_captures_combo_and_fragments() {
        let mut state = GameState::new(8);
        state.score = 4200;
        state.rhythm.max_combo = 12;
        state.fragments[0].collected = true;
        state.fragments[3].collected = true;

        let mut scores = HighScores::new();
        assert_eq!(scores.record_run(&state, 99.0), Some(1));
        let top = &scores.entries[0];
        assert_eq!(top.max_combo, 12);
        assert_eq!(top.fragments, 2);
        assert!(!top.victory);
        assert_eq!(top.timestamp, 99.0);
    }
}
