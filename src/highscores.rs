//! High score leaderboard
//!
//! Top 10 session scores, persisted to LocalStorage and rendered on the
//! game-over overlay.

use serde::{Deserialize, Serialize};

/// Maximum number of entries the board keeps
pub const MAX_HIGH_SCORES: usize = 10;

/// One finished session on the board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Final session score
    pub score: u64,
    /// Match groups cleared during the session
    pub matches: u32,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// High score leaderboard, best first
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "fruit_bowl_highscores";

    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finished session. A zero score never lands; otherwise the
    /// entry competes for the top 10 and the achieved 1-based rank comes
    /// back, or `None` when it fell off the board.
    pub fn record(&mut self, score: u64, matches: u32, timestamp: f64) -> Option<usize> {
        if score == 0 {
            return None;
        }
        self.entries.push(HighScoreEntry {
            score,
            matches,
            timestamp,
        });
        // Stable sort: an equal score ranks below the entries already holding it
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(MAX_HIGH_SCORES);
        self.entries
            .iter()
            .position(|e| e.timestamp == timestamp && e.score == score)
            .map(|rank| rank + 1)
    }

    /// Entries in rank order, for the overlay
    pub fn entries(&self) -> &[HighScoreEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Load the board from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let Some(storage) = local_storage() else {
            return Self::new();
        };
        match storage.get_item(Self::STORAGE_KEY) {
            Ok(Some(json)) => serde_json::from_str(&json).unwrap_or_else(|err| {
                log::warn!("discarding corrupt leaderboard: {err}");
                Self::new()
            }),
            _ => Self::new(),
        }
    }

    /// Save the board to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let Some(storage) = local_storage() else {
            return;
        };
        match serde_json::to_string(self) {
            Ok(json) => {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
            }
            Err(err) => log::warn!("leaderboard not saved: {err}"),
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok()?
}
