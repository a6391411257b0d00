//! Puzzle Definitions
//!
//! A [`Puzzle`] is validated once, at construction, and is immutable
//! afterwards. Everything downstream (rounds, sessions) can rely on the
//! invariants below without re-checking them.

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::core::text::{is_permutation, letter_count, normalize};

/// Fewest letters a solution may have (whitespace excluded).
pub const MIN_SOLUTION_LETTERS: usize = 4;

/// Most letters a solution may have (whitespace excluded).
pub const MAX_SOLUTION_LETTERS: usize = 20;

/// A single word-jumble puzzle.
///
/// Invariants, checked by [`Puzzle::new`]:
/// - `solution` has 4 to 20 non-whitespace characters
/// - `jumbled_word` normalizes to a permutation of the normalized solution
/// - `jumbled_word` does not normalize to the solution itself
/// - `hint` is not blank
/// - `word_count` is positive
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Puzzle {
    solution: String,
    jumbled_word: String,
    hint: String,
    word_count: u32,
}

impl Puzzle {
    /// Validate and build a puzzle.
    pub fn new(
        solution: impl Into<String>,
        jumbled_word: impl Into<String>,
        hint: impl Into<String>,
        word_count: u32,
    ) -> Result<Self, PuzzleError> {
        let solution = solution.into().trim().to_string();
        let jumbled_word = jumbled_word.into().trim().to_string();
        let hint = hint.into().trim().to_string();

        if solution.is_empty() {
            return Err(PuzzleError::MissingField("solution"));
        }
        if jumbled_word.is_empty() {
            return Err(PuzzleError::MissingField("jumbledWord"));
        }
        if hint.is_empty() {
            return Err(PuzzleError::MissingField("hint"));
        }
        if word_count == 0 {
            return Err(PuzzleError::InvalidWordCount);
        }

        let letters = letter_count(&solution);
        if !(MIN_SOLUTION_LETTERS..=MAX_SOLUTION_LETTERS).contains(&letters) {
            return Err(PuzzleError::SolutionLength(letters));
        }
        if !is_permutation(&jumbled_word, &solution) {
            return Err(PuzzleError::NotAnAnagram {
                solution,
                jumbled_word,
            });
        }
        if normalize(&jumbled_word) == normalize(&solution) {
            return Err(PuzzleError::NotScrambled(solution));
        }

        Ok(Self {
            solution,
            jumbled_word,
            hint,
            word_count,
        })
    }

    /// The answer, as shown to the player after the game.
    pub fn solution(&self) -> &str {
        &self.solution
    }

    /// Scrambled letters as produced by the source.
    pub fn jumbled_word(&self) -> &str {
        &self.jumbled_word
    }

    /// One-line clue.
    pub fn hint(&self) -> &str {
        &self.hint
    }

    /// Number of words in the solution.
    pub fn word_count(&self) -> u32 {
        self.word_count
    }

    /// Normalized solution used for matching.
    pub fn normalized_solution(&self) -> String {
        normalize(&self.solution)
    }
}

/// Untrusted puzzle as it arrives from a generator or a puzzle pack.
///
/// Every field is optional so that a malformed entry deserializes and is
/// then rejected by [`RawPuzzle::validate`] instead of failing the batch.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPuzzle {
    /// Solution phrase
    #[serde(default)]
    pub solution: Option<String>,
    /// Scrambled letters
    #[serde(default)]
    pub jumbled_word: Option<String>,
    /// Clue
    #[serde(default)]
    pub hint: Option<String>,
    /// Word count; generators sometimes emit floats here
    #[serde(default)]
    pub word_count: Option<f64>,
}

impl RawPuzzle {
    /// Convert into a validated [`Puzzle`].
    pub fn validate(self) -> Result<Puzzle, PuzzleError> {
        let solution = self.solution.ok_or(PuzzleError::MissingField("solution"))?;
        let jumbled_word = self
            .jumbled_word
            .ok_or(PuzzleError::MissingField("jumbledWord"))?;
        let hint = self.hint.ok_or(PuzzleError::MissingField("hint"))?;
        let word_count = self.word_count.ok_or(PuzzleError::MissingField("wordCount"))?;

        if !word_count.is_finite() || word_count < 1.0 || word_count.fract() != 0.0 || word_count > u32::MAX as f64 {
            return Err(PuzzleError::InvalidWordCount);
        }

        Puzzle::new(solution, jumbled_word, hint, word_count as u32)
    }
}

impl From<&Puzzle> for RawPuzzle {
    fn from(puzzle: &Puzzle) -> Self {
        Self {
            solution: Some(puzzle.solution.clone()),
            jumbled_word: Some(puzzle.jumbled_word.clone()),
            hint: Some(puzzle.hint.clone()),
            word_count: Some(puzzle.word_count as f64),
        }
    }
}

/// Why a puzzle was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PuzzleError {
    /// A required field is absent or blank.
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// Word count is zero, negative or fractional.
    #[error("word count must be a positive integer")]
    InvalidWordCount,

    /// Solution letter count outside the allowed range.
    #[error("solution has {0} letters, expected 4 to 20")]
    SolutionLength(usize),

    /// Jumble does not use the solution's letters.
    #[error("'{jumbled_word}' is not an anagram of '{solution}'")]
    NotAnAnagram {
        /// Solution phrase
        solution: String,
        /// Offending jumble
        jumbled_word: String,
    },

    /// Jumble spells the solution.
    #[error("jumble is identical to solution '{0}'")]
    NotScrambled(String),
}
