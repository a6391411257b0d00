//! Puzzle packs.
//!
//! A pack is a JSON object mapping theme names to puzzle arrays:
//!
//! ```json
//! { "Ocean Life": [ { "solution": "Dolphin", "jumbledWord": "PLHNODI",
//!                     "hint": "...", "wordCount": 1 } ] }
//! ```
//!
//! Theme lookup ignores case and surrounding whitespace.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, info, instrument};

use super::{validate_entries, PuzzleSource, SourceError};
use crate::game::puzzle::Puzzle;

/// Pack shipped with the binary.
const BUILTIN_PACK: &str = include_str!("builtin_pack.json");

/// Puzzles handed out per session, matching the generator's batch size.
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// In-memory themed puzzle collection.
#[derive(Clone, Debug)]
pub struct PuzzlePackSource {
    /// Lower-cased theme -> (display name, puzzles)
    themes: BTreeMap<String, (String, Vec<Puzzle>)>,
    batch_size: usize,
}

impl Default for PuzzlePackSource {
    fn default() -> Self {
        Self::new()
    }
}

impl PuzzlePackSource {
    /// An empty pack.
    pub fn new() -> Self {
        Self {
            themes: BTreeMap::new(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Add (or replace) a theme.
    pub fn with_theme(mut self, theme: &str, puzzles: Vec<Puzzle>) -> Self {
        let name = theme.trim().to_string();
        self.themes.insert(theme_key(&name), (name, puzzles));
        self
    }

    /// Cap the number of puzzles per session.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Parse a pack, dropping invalid puzzles.
    pub fn from_json(json: &str) -> Result<Self, SourceError> {
        let raw: BTreeMap<String, Vec<serde_json::Value>> =
            serde_json::from_str(json).map_err(|e| SourceError::Malformed(e.to_string()))?;

        let pack = raw.into_iter().fold(Self::new(), |pack, (theme, entries)| {
            let puzzles = validate_entries(entries);
            debug!(theme = %theme, count = puzzles.len(), "Loaded theme");
            pack.with_theme(&theme, puzzles)
        });

        Ok(pack)
    }

    /// Read a pack from disk.
    #[instrument]
    pub fn from_file(path: &Path) -> Result<Self, SourceError> {
        let json = std::fs::read_to_string(path).map_err(|e| SourceError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let pack = Self::from_json(&json)?;
        info!(themes = pack.themes.len(), "Puzzle pack loaded");
        Ok(pack)
    }

    /// The pack compiled into the crate.
    pub fn builtin() -> Result<Self, SourceError> {
        Self::from_json(BUILTIN_PACK)
    }

    /// Theme names, sorted case-insensitively.
    pub fn themes(&self) -> Vec<&str> {
        self.themes.values().map(|(name, _)| name.as_str()).collect()
    }

    /// Puzzles for a theme, if the pack has it.
    pub fn puzzles_for(&self, theme: &str) -> Option<&[Puzzle]> {
        self.themes
            .get(&theme_key(theme))
            .map(|(_, puzzles)| puzzles.as_slice())
    }
}

impl PuzzleSource for PuzzlePackSource {
    async fn generate_puzzles(&self, theme: &str) -> Result<Vec<Puzzle>, SourceError> {
        // Unknown themes yield an empty batch; the session turns that into
        // a NoPuzzles failure.
        Ok(self
            .puzzles_for(theme)
            .map(|puzzles| puzzles.iter().take(self.batch_size).cloned().collect())
            .unwrap_or_default())
    }
}

fn theme_key(theme: &str) -> String {
    theme.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::text::{is_permutation, normalize};

    #[test]
    fn test_builtin_pack_is_valid() {
        let pack = PuzzlePackSource::builtin().unwrap();
        assert!(pack.themes().contains(&"Ocean Life"));

        for theme in pack.themes() {
            let puzzles = pack.puzzles_for(theme).unwrap();
            assert_eq!(puzzles.len(), 5, "theme {theme} should have a full batch");
            for puzzle in puzzles {
                assert!(is_permutation(puzzle.jumbled_word(), puzzle.solution()));
                assert_ne!(normalize(puzzle.jumbled_word()), puzzle.normalized_solution());
            }
        }
    }

    #[test]
    fn test_lookup_ignores_case() {
        let pack = PuzzlePackSource::builtin().unwrap();
        assert!(pack.puzzles_for("  ocean LIFE ").is_some());
        assert!(pack.puzzles_for("Lunar Geology").is_none());
    }

    #[test]
    fn test_from_json_drops_invalid() {
        let json = r#"{
            "Pets": [
                {"solution":"Hamster","jumbledWord":"MASTHER","hint":"Cheeky rodent","wordCount":1},
                {"solution":"Cat","jumbledWord":"TAC","hint":"Too short","wordCount":1}
            ]
        }"#;
        let pack = PuzzlePackSource::from_json(json).unwrap();
        assert_eq!(pack.puzzles_for("pets").unwrap().len(), 1);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            PuzzlePackSource::from_json("[]"),
            Err(SourceError::Malformed(_))
        ));
    }

    #[test]
    fn test_from_missing_file() {
        let result = PuzzlePackSource::from_file(Path::new("/definitely/not/here.json"));
        assert!(matches!(result, Err(SourceError::Io { .. })));
    }

    #[tokio::test]
    async fn test_generate_respects_batch_size() {
        let pack = PuzzlePackSource::builtin().unwrap().with_batch_size(3);
        let puzzles = pack.generate_puzzles("Fruits").await.unwrap();
        assert_eq!(puzzles.len(), 3);
        assert_eq!(puzzles[0].solution(), "Banana");
    }

    #[tokio::test]
    async fn test_unknown_theme_is_empty() {
        let pack = PuzzlePackSource::builtin().unwrap();
        let puzzles = pack.generate_puzzles("Lunar Geology").await.unwrap();
        assert!(puzzles.is_empty());
    }
}
