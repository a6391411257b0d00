//! Session State Machine
//!
//! ```text
//!            start_game(theme)            puzzles_loaded(Ok(non-empty))
//!   Idle ─────────────────────▶ Loading ─────────────────────────────▶ Playing
//!    ▲                            │                                    │    ▲
//!    │   puzzles_loaded(Err | []) │                     round_resolved │    │ (more puzzles)
//!    ├────────────────────────────┘                                    ▼    │
//!    │                                                              (index++)
//!    │              restart                                            │
//!    └──────────────────────────────────── Finished ◀──────────────────┘
//!                                                      (last puzzle)
//! ```
//!
//! The machine holds data only. The round being played lives in
//! [`crate::game::round::RoundController`]; the engine feeds its
//! resolution back through [`SessionMachine::round_resolved`].

use serde::{Serialize, Deserialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::game::puzzle::Puzzle;
use crate::game::round::RoundResolution;
use crate::source::SourceError;

/// Unique session identifier (UUID bytes).
pub type SessionId = [u8; 16];

/// Game phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum GamePhase {
    /// No session. May carry the last load error.
    #[default]
    Idle,
    /// Waiting on the puzzle source.
    Loading,
    /// A puzzle is in play.
    Playing,
    /// All puzzles resolved; summary available.
    Finished,
}

impl GamePhase {
    /// Name used in logs and events.
    pub fn as_str(self) -> &'static str {
        match self {
            GamePhase::Idle => "idle",
            GamePhase::Loading => "loading",
            GamePhase::Playing => "playing",
            GamePhase::Finished => "finished",
        }
    }
}

/// What `round_resolved` did to the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Advance {
    /// Moved on to the puzzle at this index.
    NextPuzzle(usize),
    /// That was the last puzzle.
    Finished,
}

/// Session state.
#[derive(Clone, Debug, Default)]
pub struct SessionMachine {
    phase: GamePhase,
    session_id: Option<SessionId>,
    theme: Option<String>,
    puzzles: Vec<Puzzle>,
    index: usize,
    score: u32,
    correct: usize,
    missed: Vec<Puzzle>,
    error: Option<String>,
}

impl SessionMachine {
    /// A machine in `Idle` with nothing loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// `Idle -> Loading`.
    ///
    /// Clears any stored error, records the trimmed theme and a fresh
    /// session id. Rejected (state untouched) outside `Idle`.
    pub fn start_game(&mut self, theme: &str) -> Result<SessionId, SessionError> {
        match self.phase {
            GamePhase::Idle => {}
            GamePhase::Loading | GamePhase::Playing => {
                warn!(phase = self.phase.as_str(), "Start rejected, session busy");
                return Err(SessionError::Busy(self.phase));
            }
            GamePhase::Finished => {
                return Err(SessionError::InvalidTransition {
                    phase: self.phase,
                    action: "start_game",
                });
            }
        }

        let theme = theme.trim();
        if theme.is_empty() {
            return Err(SessionError::EmptyTheme);
        }

        let session_id = uuid::Uuid::new_v4().into_bytes();
        self.reset_session_data();
        self.error = None;
        self.theme = Some(theme.to_string());
        self.session_id = Some(session_id);
        self.phase = GamePhase::Loading;

        info!(session = %hex::encode(&session_id[..4]), theme, "Loading puzzles");
        Ok(session_id)
    }

    /// `Loading -> Playing` on a non-empty batch, `Loading -> Idle` otherwise.
    ///
    /// Returns the phase entered.
    pub fn puzzles_loaded(
        &mut self,
        result: Result<Vec<Puzzle>, SourceError>,
    ) -> Result<GamePhase, SessionError> {
        if self.phase != GamePhase::Loading {
            return Err(SessionError::InvalidTransition {
                phase: self.phase,
                action: "puzzles_loaded",
            });
        }

        let theme = self.theme.clone().unwrap_or_default();
        let result = result.and_then(|puzzles| {
            if puzzles.is_empty() {
                Err(SourceError::NoPuzzles { theme: theme.clone() })
            } else {
                Ok(puzzles)
            }
        });

        match result {
            Ok(puzzles) => {
                info!(count = puzzles.len(), theme = %theme, "Session playing");
                self.puzzles = puzzles;
                self.index = 0;
                self.score = 0;
                self.correct = 0;
                self.missed.clear();
                self.phase = GamePhase::Playing;
            }
            Err(err) => {
                warn!(error = %err, theme = %theme, "Puzzle load failed");
                self.reset_session_data();
                self.theme = None;
                self.session_id = None;
                self.error = Some(err.user_message());
                self.phase = GamePhase::Idle;
            }
        }

        Ok(self.phase)
    }

    /// Apply the resolution of the current puzzle.
    pub fn round_resolved(&mut self, resolution: RoundResolution) -> Result<Advance, SessionError> {
        if self.phase != GamePhase::Playing {
            return Err(SessionError::InvalidTransition {
                phase: self.phase,
                action: "round_resolved",
            });
        }

        let puzzle = self
            .puzzles
            .get(self.index)
            .cloned()
            .ok_or(SessionError::IndexOutOfRange(self.index))?;

        match resolution {
            RoundResolution::Correct { points } => {
                self.score = self.score.saturating_add(points);
                self.correct += 1;
            }
            RoundResolution::TimedOut => {
                self.missed.push(puzzle);
            }
        }

        debug!(index = self.index, ?resolution, score = self.score, "Round resolved");

        if self.index + 1 >= self.puzzles.len() {
            self.phase = GamePhase::Finished;
            info!(score = self.score, missed = self.missed.len(), "Session finished");
            Ok(Advance::Finished)
        } else {
            self.index += 1;
            Ok(Advance::NextPuzzle(self.index))
        }
    }

    /// Back to `Idle`, discarding the session.
    ///
    /// Accepted from `Finished`, `Playing` (abandon) and `Idle` (clears a
    /// stored error). Rejected while `Loading`.
    pub fn restart(&mut self) -> Result<(), SessionError> {
        if self.phase == GamePhase::Loading {
            return Err(SessionError::Busy(self.phase));
        }
        if self.phase == GamePhase::Playing {
            info!(index = self.index, "Session abandoned");
        }

        self.reset_session_data();
        self.theme = None;
        self.session_id = None;
        self.error = None;
        self.phase = GamePhase::Idle;
        Ok(())
    }

    fn reset_session_data(&mut self) {
        self.puzzles.clear();
        self.index = 0;
        self.score = 0;
        self.correct = 0;
        self.missed.clear();
    }

    /// Current phase.
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Session id while a session exists.
    pub fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }

    /// Selected theme.
    pub fn theme(&self) -> Option<&str> {
        self.theme.as_deref()
    }

    /// All puzzles of the session.
    pub fn puzzles(&self) -> &[Puzzle] {
        &self.puzzles
    }

    /// Index of the current puzzle.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Puzzle in play, only while `Playing`.
    pub fn current_puzzle(&self) -> Option<&Puzzle> {
        if self.phase == GamePhase::Playing {
            self.puzzles.get(self.index)
        } else {
            None
        }
    }

    /// Accumulated score.
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Rounds answered correctly.
    pub fn correct_count(&self) -> usize {
        self.correct
    }

    /// Puzzles that timed out, in order.
    pub fn missed(&self) -> &[Puzzle] {
        &self.missed
    }

    /// Rounds resolved so far.
    pub fn answered(&self) -> usize {
        self.correct + self.missed.len()
    }

    /// Message from the last failed load.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Session errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// A session is loading or in progress.
    #[error("a game is already {}", .0.as_str())]
    Busy(GamePhase),

    /// Operation not valid in this phase.
    #[error("cannot {action} while {}", .phase.as_str())]
    InvalidTransition {
        /// Phase at the time of the call
        phase: GamePhase,
        /// Attempted operation
        action: &'static str,
    },

    /// Theme is blank.
    #[error("theme must not be empty")]
    EmptyTheme,

    /// Current index points past the puzzle list.
    #[error("puzzle index {0} out of range")]
    IndexOutOfRange(usize),
}
