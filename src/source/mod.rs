//! Puzzle Sources
//!
//! The engine never generates puzzles itself. It asks a [`PuzzleSource`]
//! for a batch and treats whatever comes back as untrusted: invalid
//! entries are dropped here, and an empty batch becomes a failure in the
//! session machine.

pub mod pack;
pub mod themes;

use std::future::Future;

use thiserror::Error;
use tracing::warn;

use crate::game::puzzle::{Puzzle, RawPuzzle};

pub use pack::PuzzlePackSource;
pub use themes::{PRESET_THEMES, SUGGESTION_COUNT, suggest_themes};

/// Asynchronous producer of puzzles for a theme.
///
/// Implementations return a finite, ordered, possibly empty batch of
/// validated puzzles, or an error.
pub trait PuzzleSource: Send + Sync {
    /// Produce puzzles for `theme`.
    fn generate_puzzles(
        &self,
        theme: &str,
    ) -> impl Future<Output = Result<Vec<Puzzle>, SourceError>> + Send;
}

/// Puzzle source failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// The generator could not be reached or refused the request.
    #[error("puzzle source unavailable: {0}")]
    Unavailable(String),

    /// The generator answered with something that is not a puzzle batch.
    #[error("malformed puzzle batch: {0}")]
    Malformed(String),

    /// Nothing usable for this theme.
    #[error("no puzzles for theme '{theme}'")]
    NoPuzzles {
        /// Requested theme
        theme: String,
    },

    /// A puzzle pack could not be read.
    #[error("failed to read {path}: {message}")]
    Io {
        /// File that failed
        path: String,
        /// OS error text
        message: String,
    },
}

impl SourceError {
    /// Message suitable for showing to the player.
    pub fn user_message(&self) -> String {
        match self {
            SourceError::NoPuzzles { theme } => format!(
                "Couldn't come up with puzzles for \"{theme}\". Please try another theme."
            ),
            _ => "Failed to generate puzzles. The generator might be busy, or the theme might be too restrictive. Please try again."
                .to_string(),
        }
    }
}

/// Parse a generator response: a JSON array of puzzle objects.
///
/// Entries that are not objects, miss a field, or break a puzzle
/// invariant are dropped and logged. Only a response that is not a JSON
/// array at all is an error.
pub fn parse_puzzle_batch(json: &str) -> Result<Vec<Puzzle>, SourceError> {
    let text = json.trim();
    if !text.starts_with('[') || !text.ends_with(']') {
        return Err(SourceError::Malformed("expected a JSON array".to_string()));
    }

    let entries: Vec<serde_json::Value> =
        serde_json::from_str(text).map_err(|e| SourceError::Malformed(e.to_string()))?;

    Ok(validate_entries(entries))
}

/// Validate raw JSON entries, keeping the good ones in order.
pub(crate) fn validate_entries(entries: Vec<serde_json::Value>) -> Vec<Puzzle> {
    let total = entries.len();
    let puzzles: Vec<Puzzle> = entries
        .into_iter()
        .enumerate()
        .filter_map(|(i, entry)| {
            let raw: RawPuzzle = match serde_json::from_value(entry) {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(entry = i, error = %e, "Dropping unreadable puzzle");
                    return None;
                }
            };
            match raw.validate() {
                Ok(puzzle) => Some(puzzle),
                Err(e) => {
                    warn!(entry = i, error = %e, "Dropping invalid puzzle");
                    None
                }
            }
        })
        .collect();

    if puzzles.len() < total {
        warn!(kept = puzzles.len(), total, "Puzzle batch filtered");
    }
    puzzles
}
