//! # Word Jumble Session Engine
//!
//! Gameplay core for a themed word-jumble game: a theme goes to a puzzle
//! source, a batch of scrambled words comes back, and the player races a
//! countdown through them with an optional hint ladder.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    WORD JUMBLE ENGINE                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Primitives                                │
//! │  ├── rng.rs      - Deterministic Xorshift128+ PRNG           │
//! │  ├── text.rs     - Answer normalization                      │
//! │  └── countdown.rs- Cancelable countdown                      │
//! │                                                              │
//! │  game/           - Game logic (no I/O, no clocks)            │
//! │  ├── puzzle.rs   - Validated puzzles                         │
//! │  ├── round.rs    - Round controller                          │
//! │  ├── session.rs  - Session state machine                     │
//! │  ├── stats.rs    - Lifetime stats aggregator                 │
//! │  ├── events.rs   - Event stream                              │
//! │  └── engine.rs   - Composition                               │
//! │                                                              │
//! │  source/         - Puzzle sources and preset themes          │
//! │  storage/        - Lifetime stats persistence                │
//! │  runtime/        - Tokio driver (ticks, commands, loads)     │
//! │  config.rs       - Environment configuration                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism
//!
//! `core/` and `game/` never read the clock. Time moves only when the
//! driver calls `tick`, and every shuffle draws from a seeded
//! Xorshift128+ stream, so a session replays exactly from its seed and
//! its command sequence.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod core;
pub mod game;
pub mod runtime;
pub mod source;
pub mod storage;

// Re-export commonly used types
pub use crate::config::GameConfig;
pub use crate::core::rng::DeterministicRng;
pub use game::engine::{EngineError, GameEngine};
pub use game::puzzle::Puzzle;
pub use game::session::GamePhase;
pub use game::stats::LifetimeStats;
pub use runtime::{Command, DriverHandle, GameDriver};
pub use source::{PuzzlePackSource, PuzzleSource, SourceError};
pub use storage::{JsonFileStore, MemoryStore, StatsStore};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Seconds on the clock at the start of each round
pub const ROUND_DURATION_SECONDS: u32 = 30;

/// Points for any correct answer, before the time bonus
pub const BASE_POINTS: u32 = 10;

/// Total deduction once the text hint is shown
pub const TEXT_HINT_PENALTY: u32 = 3;

/// Total deduction once letters are revealed (not added to the text hint's)
pub const LETTER_REVEAL_PENALTY: u32 = 5;

/// Letters of the solution locked into the input by the second hint
pub const REVEAL_PREFIX_LEN: usize = 3;
