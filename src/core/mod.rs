//! Core primitives.
//!
//! Nothing here knows about puzzles or sessions: seeded randomness, text
//! normalization and the cancelable countdown that rounds are timed with.

pub mod countdown;
pub mod rng;
pub mod text;

// Re-export core types
pub use countdown::{Countdown, CountdownState, CountdownTick};
pub use rng::{DeterministicRng, derive_session_seed};
pub use text::normalize;
