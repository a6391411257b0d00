//! Game Events
//!
//! Everything observable that the engine does is recorded as a
//! [`GameEvent`]. Frontends render from the event stream; tests assert on
//! it.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::game::puzzle::Puzzle;
use crate::game::round::{Feedback, HintLevel, RoundResolution};
use crate::game::session::GamePhase;
use crate::game::stats::{LifetimeStats, SkillLevel};

/// End-of-session report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    /// Hex session id
    pub session_id: String,
    /// Theme played
    pub theme: String,
    /// Session score
    pub score: u32,
    /// Puzzles solved
    pub correct: usize,
    /// Puzzles in the session
    pub total: usize,
    /// Puzzles that timed out, with their solutions
    pub missed: Vec<Puzzle>,
    /// Rating of this session's score
    pub skill: SkillLevel,
    /// Lifetime record including this session
    pub lifetime: LifetimeStats,
    /// Rating of the lifetime average
    pub overall_skill: SkillLevel,
    /// When the last round resolved
    pub finished_at: DateTime<Utc>,
}

/// Game event data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEventData {
    /// Session phase changed
    PhaseChanged {
        /// Phase left
        from: GamePhase,
        /// Phase entered
        to: GamePhase,
    },

    /// Puzzle source failed or produced nothing usable
    LoadFailed {
        /// Player-facing message
        message: String,
    },

    /// A command arrived in a phase that does not accept it
    CommandRejected {
        /// Command name
        command: String,
        /// Why it was refused
        reason: String,
    },

    /// New round on screen
    RoundStarted {
        /// Zero-based round index
        index: usize,
        /// Rounds in the session
        total: usize,
        /// Scrambled letters
        display: String,
        /// Words in the solution
        word_count: u32,
        /// Countdown length
        seconds: u32,
    },

    /// One second elapsed
    Tick {
        /// Seconds left
        remaining: u32,
    },

    /// A guess was checked
    GuessChecked {
        /// Verdict on the guess
        feedback: Feedback,
        /// Input buffer after the check
        input: String,
    },

    /// Input reverted to the revealed prefix
    InputReset {
        /// Restored input buffer
        input: String,
    },

    /// Hint ladder advanced
    HintShown {
        /// Rung reached
        level: HintLevel,
        /// Clue text, once shown
        hint: Option<String>,
        /// Locked letters, once revealed
        prefix: Option<String>,
    },

    /// Jumble re-scrambled
    Shuffled {
        /// New arrangement
        display: String,
    },

    /// Round ended
    RoundResolved {
        /// Zero-based round index
        index: usize,
        /// How the round ended
        resolution: RoundResolution,
        /// The answer
        solution: String,
        /// Session score so far
        score: u32,
    },

    /// All rounds played
    SessionFinished {
        /// End-of-session report
        summary: SessionSummary,
    },

    /// Lifetime stats written (or kept in memory after a failed write)
    StatsUpdated {
        /// Updated lifetime record
        stats: LifetimeStats,
        /// Whether the write succeeded
        saved: bool,
    },
}

/// A game event with its position in the stream.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GameEvent {
    /// Monotonic sequence number, starting at 0
    pub seq: u64,

    /// Event data
    pub data: GameEventData,
}

/// Stamps events with sequence numbers and buffers them until drained.
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    next_seq: u64,
    pending: Vec<GameEvent>,
}

impl EventLog {
    /// Empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event.
    pub fn push(&mut self, data: GameEventData) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(GameEvent { seq, data });
    }

    /// Take all buffered events, oldest first.
    pub fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending)
    }

    /// Number of buffered events.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
