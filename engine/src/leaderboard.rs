//! In-memory leaderboard fed by `session_ended` events.
//!
//! Keeps the best ten results, highest first. Equal scores keep arrival
//! order. Persisting the table is left to the host.

use crate::protocol::SessionEndedMsg;
use serde::{Deserialize, Serialize};

/// Maximum number of entries to keep
pub const MAX_ENTRIES: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub player_name: String,
    pub score: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a score would make it onto a full board
    pub fn qualifies(&self, score: u64) -> bool {
        if self.entries.len() < MAX_ENTRIES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Record a finished session. Returns the 1-based rank, or None if it
    /// fell off the bottom.
    pub fn record(&mut self, ended: SessionEndedMsg) -> Option<usize> {
        if !self.qualifies(ended.final_score) {
            tracing::debug!(
                "Score {} for {} did not make the board",
                ended.final_score,
                ended.player_name
            );
            return None;
        }

        let entry = LeaderboardEntry {
            player_name: ended.player_name,
            score: ended.final_score,
        };

        // Insert after every entry with an equal or higher score
        let pos = self
            .entries
            .iter()
            .position(|e| entry.score > e.score)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, entry);
        self.entries.truncate(MAX_ENTRIES);

        Some(pos + 1)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }
}
