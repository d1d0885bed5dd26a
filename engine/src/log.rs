//! Storyteller-facing game log.

use std::fmt;

use chrono::{DateTime, Utc};
use townsquare_core::GameEvent;

/// Longest entry text kept, in characters.
pub const LOG_ENTRY_LIMIT: usize = 2000;

const ELLIPSIS: char = '…';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameLogEntry {
    pub at: DateTime<Utc>,
    pub text: String,
}

impl GameLogEntry {
    #[must_use]
    pub fn new(at: DateTime<Utc>, event: &GameEvent) -> Self {
        Self {
            at,
            text: truncate_chars(&event.to_string(), LOG_ENTRY_LIMIT),
        }
    }

    #[must_use]
    pub fn now(event: &GameEvent) -> Self {
        Self::new(Utc::now(), event)
    }
}

impl fmt::Display for GameLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.at.format("%Y-%m-%d %H:%M:%S UTC"), self.text)
    }
}

/// Cut `text` to at most `limit` characters, marking the cut with an ellipsis.
fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        None => text.to_string(),
        Some(_) => {
            let mut out: String = text.chars().take(limit.saturating_sub(1)).collect();
            out.push(ELLIPSIS);
            out
        }
    }
}
