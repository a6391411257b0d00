//! Game Logic Module
//!
//! Everything that decides what happens in a game. No I/O besides the
//! stats store handed in from outside, and no clocks: time advances only
//! through explicit ticks.
//!
//! ## Module Structure
//!
//! - `puzzle`: Validated puzzle values
//! - `round`: Per-puzzle controller (countdown, hints, guesses, shuffles)
//! - `session`: Phase state machine and score bookkeeping
//! - `stats`: Lifetime stats aggregation and skill rating
//! - `events`: Event stream for frontends and tests
//! - `engine`: Composition of the above

pub mod puzzle;
pub mod round;
pub mod session;
pub mod stats;
pub mod events;
pub mod engine;

// Re-export key types
pub use puzzle::{Puzzle, PuzzleError, RawPuzzle};
pub use round::{
    GuessOutcome, HintLevel, InputEdit, RoundConfig, RoundController, RoundOutcome,
    RoundResolution, RoundState, TickOutcome,
};
pub use session::{GamePhase, SessionError, SessionId, SessionMachine};
pub use stats::{LifetimeStats, SkillLevel, StatsAggregator, StatsError};
pub use events::{GameEvent, GameEventData, SessionSummary};
pub use engine::{EngineError, GameEngine};
