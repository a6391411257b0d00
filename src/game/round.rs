//! Puzzle Round Controller
//!
//! One [`RoundController`] exists per puzzle. It owns the countdown, the
//! hint ladder, the displayed jumble and the input buffer, and it is the
//! only thing allowed to mutate them. Once the round resolves (a correct
//! guess or a timeout) every operation becomes a no-op.
//!
//! ## Scoring
//!
//! ```text
//! points = max(0, 10 + remaining_seconds - hint_penalty)
//!
//!   hint level      penalty
//!   None            0
//!   TextHint        3
//!   LetterReveal    5   (total, not 3 + 5)
//! ```

use serde::{Serialize, Deserialize};
use tracing::{debug, trace};

use crate::core::countdown::{Countdown, CountdownTick};
use crate::core::rng::DeterministicRng;
use crate::core::text::{matches, normalize, prefix, starts_with_ignore_case};
use crate::game::puzzle::Puzzle;
use crate::{
    BASE_POINTS, LETTER_REVEAL_PENALTY, REVEAL_PREFIX_LEN, ROUND_DURATION_SECONDS,
    TEXT_HINT_PENALTY,
};

/// Re-rolls attempted before a shuffle gives up and leaves the display alone.
pub const MAX_SHUFFLE_ATTEMPTS: u32 = 64;

// =============================================================================
// CONFIG
// =============================================================================

/// Per-round settings shared by every round of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundConfig {
    /// Countdown length in seconds.
    pub duration_seconds: u32,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            duration_seconds: ROUND_DURATION_SECONDS,
        }
    }
}

// =============================================================================
// HINT LADDER
// =============================================================================

/// Hint ladder position. Monotonic within a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum HintLevel {
    /// No hint used
    #[default]
    None,
    /// Text clue shown
    TextHint,
    /// Clue shown and the first letters locked into the input
    LetterReveal,
}

impl HintLevel {
    /// Next rung, if any.
    pub fn next(self) -> Option<HintLevel> {
        match self {
            HintLevel::None => Some(HintLevel::TextHint),
            HintLevel::TextHint => Some(HintLevel::LetterReveal),
            HintLevel::LetterReveal => None,
        }
    }

    /// Total points deducted at this level.
    pub fn penalty(self) -> u32 {
        match self {
            HintLevel::None => 0,
            HintLevel::TextHint => TEXT_HINT_PENALTY,
            HintLevel::LetterReveal => LETTER_REVEAL_PENALTY,
        }
    }

    /// Whether the text clue is visible.
    pub fn shows_text(self) -> bool {
        self >= HintLevel::TextHint
    }
}

/// Points for a correct answer.
#[inline]
pub fn points_for(remaining_seconds: u32, hint_level: HintLevel) -> u32 {
    BASE_POINTS
        .saturating_add(remaining_seconds)
        .saturating_sub(hint_level.penalty())
}

// =============================================================================
// ROUND STATE
// =============================================================================

/// Terminal status of a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RoundOutcome {
    /// Still accepting guesses
    #[default]
    Pending,
    /// Solved
    Correct,
    /// Countdown reached zero
    TimedOut,
}

/// Feedback from the most recent guess.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Feedback {
    /// No guess yet
    #[default]
    None,
    /// Last guess solved the puzzle
    Correct,
    /// Last guess was wrong; the round continues
    Incorrect,
}

/// Everything that changes during a round.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoundState {
    /// Jumble currently shown (reshuffles change this)
    pub display: String,
    /// Seconds left on the countdown
    pub remaining_seconds: u32,
    /// Hint ladder position
    pub hint_level: HintLevel,
    /// Player's input buffer
    pub input: String,
    /// Locked prefix once letters are revealed
    pub reveal_prefix: Option<String>,
    /// Round status
    pub outcome: RoundOutcome,
    /// Last guess feedback
    pub feedback: Feedback,
    /// Points awarded (set once, on a correct guess)
    pub points: Option<u32>,
    /// Guesses submitted, right or wrong
    pub guesses: u32,
}

/// How a round ended, as reported to the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundResolution {
    /// Solved for this many points.
    Correct {
        /// Points earned
        points: u32,
    },
    /// Time ran out.
    TimedOut,
}

// =============================================================================
// OPERATION RESULTS
// =============================================================================

/// Result of [`RoundController::tick`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Countdown advanced.
    Running {
        /// Seconds left
        remaining: u32,
    },
    /// This tick ended the round.
    TimedOut,
    /// The round is already resolved; nothing changed.
    Ignored,
}

/// Result of a guess.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuessOutcome {
    /// Solved.
    Correct {
        /// Points earned
        points: u32,
    },
    /// Wrong; the buffer was cleared back to the locked prefix (or emptied).
    Incorrect {
        /// Buffer after the reset
        input: String,
    },
    /// Guess dropped the revealed prefix; buffer reset to the prefix.
    PrefixViolation {
        /// Buffer after the reset
        input: String,
    },
    /// Round already resolved.
    Ignored,
}

/// Result of an input edit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputEdit {
    /// Buffer replaced with the edit.
    Accepted,
    /// Edit removed the locked prefix; buffer reset to the prefix.
    Reset {
        /// Buffer after the reset
        input: String,
    },
    /// Round already resolved.
    Ignored,
}

// =============================================================================
// CONTROLLER
// =============================================================================

/// Controller for one puzzle.
#[derive(Clone, Debug)]
pub struct RoundController {
    puzzle: Puzzle,
    state: RoundState,
    countdown: Countdown,
    rng: DeterministicRng,
}

impl RoundController {
    /// Start a round; the countdown begins immediately.
    pub fn start(puzzle: Puzzle, config: &RoundConfig, rng: DeterministicRng) -> Self {
        let state = RoundState {
            display: puzzle.jumbled_word().to_string(),
            remaining_seconds: config.duration_seconds,
            hint_level: HintLevel::None,
            input: String::new(),
            reveal_prefix: None,
            outcome: RoundOutcome::Pending,
            feedback: Feedback::None,
            points: None,
            guesses: 0,
        };

        debug!(
            display = %state.display,
            seconds = config.duration_seconds,
            "Round started"
        );

        Self {
            puzzle,
            state,
            countdown: Countdown::start(config.duration_seconds),
            rng,
        }
    }

    /// Advance the countdown by one second.
    pub fn tick(&mut self) -> TickOutcome {
        if self.state.outcome != RoundOutcome::Pending {
            return TickOutcome::Ignored;
        }

        match self.countdown.tick() {
            CountdownTick::Running(remaining) => {
                self.state.remaining_seconds = remaining;
                trace!(remaining, "Tick");
                TickOutcome::Running { remaining }
            }
            CountdownTick::Expired => {
                self.state.remaining_seconds = 0;
                self.state.outcome = RoundOutcome::TimedOut;
                debug!(solution = %self.puzzle.solution(), "Round timed out");
                TickOutcome::TimedOut
            }
            CountdownTick::Stopped => TickOutcome::Ignored,
        }
    }

    /// Check a guess against the solution.
    pub fn submit_guess(&mut self, text: &str) -> GuessOutcome {
        if self.state.outcome != RoundOutcome::Pending {
            return GuessOutcome::Ignored;
        }

        self.state.guesses += 1;

        if let Some(locked) = &self.state.reveal_prefix {
            if !starts_with_ignore_case(text, locked) {
                self.state.input = locked.clone();
                self.state.feedback = Feedback::Incorrect;
                return GuessOutcome::PrefixViolation {
                    input: self.state.input.clone(),
                };
            }
        }

        if matches(text, self.puzzle.solution()) {
            self.countdown.cancel();
            let points = points_for(self.state.remaining_seconds, self.state.hint_level);
            self.state.outcome = RoundOutcome::Correct;
            self.state.feedback = Feedback::Correct;
            self.state.points = Some(points);
            self.state.input = text.to_string();
            debug!(points, remaining = self.state.remaining_seconds, "Correct guess");
            GuessOutcome::Correct { points }
        } else {
            self.state.input = self.state.reveal_prefix.clone().unwrap_or_default();
            self.state.feedback = Feedback::Incorrect;
            GuessOutcome::Incorrect {
                input: self.state.input.clone(),
            }
        }
    }

    /// Submit whatever is in the input buffer.
    pub fn submit_input(&mut self) -> GuessOutcome {
        let text = self.state.input.clone();
        self.submit_guess(&text)
    }

    /// Replace the input buffer, enforcing the revealed-prefix lock.
    pub fn edit_input(&mut self, text: &str) -> InputEdit {
        if self.state.outcome != RoundOutcome::Pending {
            return InputEdit::Ignored;
        }

        match &self.state.reveal_prefix {
            Some(locked) if !starts_with_ignore_case(text, locked) => {
                self.state.input = locked.clone();
                InputEdit::Reset {
                    input: self.state.input.clone(),
                }
            }
            _ => {
                self.state.input = text.to_string();
                InputEdit::Accepted
            }
        }
    }

    /// Climb one rung of the hint ladder. A third request is a no-op.
    ///
    /// Returns the hint level after the call.
    pub fn request_hint(&mut self) -> HintLevel {
        if self.state.outcome != RoundOutcome::Pending {
            return self.state.hint_level;
        }

        if let Some(next) = self.state.hint_level.next() {
            self.state.hint_level = next;
            if next == HintLevel::LetterReveal {
                let locked = prefix(self.puzzle.solution(), REVEAL_PREFIX_LEN);
                self.state.input = locked.clone();
                self.state.reveal_prefix = Some(locked);
            }
            debug!(level = ?next, "Hint requested");
        }

        self.state.hint_level
    }

    /// Re-scramble the displayed letters.
    ///
    /// The new arrangement differs from the current one and never spells
    /// the solution. Returns `None` (display unchanged) when the round is
    /// resolved or no such arrangement turned up within
    /// [`MAX_SHUFFLE_ATTEMPTS`] re-rolls.
    pub fn shuffle_display(&mut self) -> Option<&str> {
        if self.state.outcome != RoundOutcome::Pending {
            return None;
        }

        let current = self.state.display.clone();
        let solution = self.puzzle.normalized_solution();
        let mut letters: Vec<char> = current.chars().collect();

        for _ in 0..MAX_SHUFFLE_ATTEMPTS {
            self.rng.shuffle(&mut letters);
            let candidate: String = letters.iter().collect();

            let same_as_before = letters.len() > 1 && candidate == current;
            if same_as_before || normalize(&candidate) == solution {
                continue;
            }

            self.state.display = candidate;
            return Some(&self.state.display);
        }

        debug!(display = %current, "No new arrangement found");
        None
    }

    /// Stop the countdown without resolving, for teardown.
    pub fn cancel(&mut self) {
        self.countdown.cancel();
    }

    /// How the round ended, if it has.
    pub fn resolution(&self) -> Option<RoundResolution> {
        match self.state.outcome {
            RoundOutcome::Pending => None,
            RoundOutcome::Correct => Some(RoundResolution::Correct {
                points: self.state.points.unwrap_or(0),
            }),
            RoundOutcome::TimedOut => Some(RoundResolution::TimedOut),
        }
    }

    /// Whether the round has resolved.
    pub fn is_resolved(&self) -> bool {
        self.state.outcome != RoundOutcome::Pending
    }

    /// Whether ticks still reach this round.
    pub fn is_ticking(&self) -> bool {
        self.countdown.is_running()
    }

    /// The puzzle being played.
    pub fn puzzle(&self) -> &Puzzle {
        &self.puzzle
    }

    /// Read-only view of the round state.
    pub fn state(&self) -> &RoundState {
        &self.state
    }

    /// Text clue, once the player has asked for it.
    pub fn visible_hint(&self) -> Option<&str> {
        self.state
            .hint_level
            .shows_text()
            .then(|| self.puzzle.hint())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn dolphin() -> Puzzle {
        Puzzle::new("Dolphin", "PLHNODI", "A clever marine mammal", 1).unwrap()
    }

    fn sea_turtle() -> Puzzle {
        Puzzle::new("Sea Turtle", "TRULETEAS", "Shelled reptile", 2).unwrap()
    }

    fn start(puzzle: Puzzle) -> RoundController {
        RoundController::start(puzzle, &RoundConfig::default(), DeterministicRng::new(7))
    }

    fn tick_n(round: &mut RoundController, n: u32) {
        for _ in 0..n {
            round.tick();
        }
    }

    #[test]
    fn test_start_state() {
        let round = start(dolphin());
        let state = round.state();
        assert_eq!(state.display, "PLHNODI");
        assert_eq!(state.remaining_seconds, 30);
        assert_eq!(state.hint_level, HintLevel::None);
        assert_eq!(state.input, "");
        assert_eq!(state.outcome, RoundOutcome::Pending);
        assert!(round.is_ticking());
        assert!(round.visible_hint().is_none());
    }

    #[test]
    fn test_points_table() {
        assert_eq!(points_for(20, HintLevel::None), 30);
        assert_eq!(points_for(10, HintLevel::TextHint), 17);
        assert_eq!(points_for(0, HintLevel::LetterReveal), 5);
        assert_eq!(points_for(0, HintLevel::TextHint), 7);
        assert_eq!(points_for(30, HintLevel::None), 40);
    }

    #[test]
    fn test_correct_guess_scores_and_stops_countdown() {
        let mut round = start(dolphin());
        tick_n(&mut round, 10);

        assert_eq!(round.submit_guess("  DOLPHIN "), GuessOutcome::Correct { points: 30 });
        assert_eq!(round.state().outcome, RoundOutcome::Correct);
        assert_eq!(round.resolution(), Some(RoundResolution::Correct { points: 30 }));
        assert!(!round.is_ticking());

        // Resolved rounds are frozen
        assert_eq!(round.tick(), TickOutcome::Ignored);
        assert_eq!(round.state().remaining_seconds, 20);
        assert_eq!(round.submit_guess("dolphin"), GuessOutcome::Ignored);
        assert_eq!(round.request_hint(), HintLevel::None);
        assert!(round.shuffle_display().is_none());
    }

    #[test]
    fn test_multi_word_guess_ignores_spacing() {
        let mut round = start(sea_turtle());
        assert!(matches!(round.submit_guess("seaturtle"), GuessOutcome::Correct { .. }));
    }

    #[test]
    fn test_incorrect_guess_is_retryable() {
        let mut round = start(dolphin());
        round.edit_input("dolfin");
        assert_eq!(
            round.submit_input(),
            GuessOutcome::Incorrect { input: String::new() }
        );
        assert_eq!(round.state().outcome, RoundOutcome::Pending);
        assert_eq!(round.state().feedback, Feedback::Incorrect);
        assert_eq!(round.state().input, "");
        assert!(round.is_ticking());

        assert_eq!(round.submit_guess("dolphin"), GuessOutcome::Correct { points: 40 });
        assert_eq!(round.state().guesses, 2);
    }

    #[test]
    fn test_timeout_reported_once() {
        let mut round = start(dolphin());
        let mut timeouts = 0;
        for _ in 0..40 {
            if round.tick() == TickOutcome::TimedOut {
                timeouts += 1;
            }
        }
        assert_eq!(timeouts, 1);
        assert_eq!(round.state().outcome, RoundOutcome::TimedOut);
        assert_eq!(round.resolution(), Some(RoundResolution::TimedOut));
        assert_eq!(round.submit_guess("dolphin"), GuessOutcome::Ignored);
        assert_eq!(round.edit_input("dol"), InputEdit::Ignored);
    }

    #[test]
    fn test_timeout_on_thirtieth_tick() {
        let mut round = start(dolphin());
        tick_n(&mut round, 29);
        assert_eq!(round.state().remaining_seconds, 1);
        assert_eq!(round.state().outcome, RoundOutcome::Pending);
        assert_eq!(round.tick(), TickOutcome::TimedOut);
    }

    #[test]
    fn test_hint_ladder() {
        let mut round = start(dolphin());

        assert_eq!(round.request_hint(), HintLevel::TextHint);
        assert_eq!(round.visible_hint(), Some("A clever marine mammal"));
        assert_eq!(round.state().input, "");

        assert_eq!(round.request_hint(), HintLevel::LetterReveal);
        assert_eq!(round.state().input, "Dol");
        assert_eq!(round.state().reveal_prefix.as_deref(), Some("Dol"));

        // Third request is a no-op
        round.edit_input("Dolp");
        assert_eq!(round.request_hint(), HintLevel::LetterReveal);
        assert_eq!(round.state().input, "Dolp");
    }

    #[test]
    fn test_hint_does_not_stop_countdown() {
        let mut round = start(dolphin());
        round.request_hint();
        round.request_hint();
        assert!(round.is_ticking());
        assert_eq!(round.tick(), TickOutcome::Running { remaining: 29 });
    }

    #[test]
    fn test_hint_penalties_are_not_cumulative() {
        let mut round = start(dolphin());
        tick_n(&mut round, 30 - 12);
        round.request_hint();
        round.request_hint();
        // 10 + 12 - 5, not 10 + 12 - 8
        assert_eq!(round.submit_guess("dolphin"), GuessOutcome::Correct { points: 17 });
    }

    #[test]
    fn test_text_hint_scoring() {
        let mut round = start(dolphin());
        round.request_hint();
        tick_n(&mut round, 20);
        assert_eq!(round.submit_guess("Dolphin"), GuessOutcome::Correct { points: 17 });
    }

    #[test]
    fn test_prefix_lock_on_edit() {
        let mut round = start(dolphin());
        round.request_hint();
        round.request_hint();

        assert_eq!(round.edit_input("dolph"), InputEdit::Accepted);
        assert_eq!(round.state().input, "dolph");

        // Deleting into the prefix resets it
        assert_eq!(round.edit_input("Do"), InputEdit::Reset { input: "Dol".to_string() });
        assert_eq!(round.state().input, "Dol");

        assert_eq!(round.edit_input("xyz"), InputEdit::Reset { input: "Dol".to_string() });
        assert_eq!(round.edit_input("DOLX"), InputEdit::Accepted);
    }

    #[test]
    fn test_prefix_lock_on_guess() {
        let mut round = start(dolphin());
        round.request_hint();
        round.request_hint();

        assert_eq!(
            round.submit_guess("porpoise"),
            GuessOutcome::PrefixViolation { input: "Dol".to_string() }
        );
        assert_eq!(
            round.submit_guess("dolly"),
            GuessOutcome::Incorrect { input: "Dol".to_string() }
        );
        assert_eq!(round.state().outcome, RoundOutcome::Pending);
        assert!(matches!(round.submit_guess("DOLPHIN"), GuessOutcome::Correct { .. }));
    }

    #[test]
    fn test_prefix_lock_with_spaced_solution() {
        let puzzle = Puzzle::new("Ox Bow", "WOBOX", "Curved lake", 2).unwrap();
        let mut round = start(puzzle);
        round.request_hint();
        round.request_hint();
        assert_eq!(round.state().input, "Ox ");

        // The locked space is part of the prefix
        assert_eq!(round.edit_input("Ox"), InputEdit::Reset { input: "Ox ".to_string() });
        assert_eq!(round.edit_input("Oxb"), InputEdit::Reset { input: "Ox ".to_string() });
        assert_eq!(round.edit_input("OX B"), InputEdit::Accepted);
        assert_eq!(
            round.submit_guess("oxbow"),
            GuessOutcome::PrefixViolation { input: "Ox ".to_string() }
        );
        assert!(matches!(round.submit_guess("ox bow"), GuessOutcome::Correct { .. }));
    }

    #[test]
    fn test_prefix_lock_rejects_spaced_out_letters() {
        let mut round = start(dolphin());
        round.request_hint();
        round.request_hint();

        assert_eq!(round.edit_input(" D o l"), InputEdit::Reset { input: "Dol".to_string() });
        assert_eq!(round.state().input, "Dol");
        assert_eq!(
            round.submit_guess(" dolphin"),
            GuessOutcome::PrefixViolation { input: "Dol".to_string() }
        );
    }

    #[test]
    fn test_zero_duration_round() {
        let config = RoundConfig { duration_seconds: 0 };
        let mut round = RoundController::start(dolphin(), &config, DeterministicRng::new(1));
        round.request_hint();
        round.request_hint();
        assert_eq!(round.submit_guess("dolphin"), GuessOutcome::Correct { points: 5 });

        let mut idle = RoundController::start(dolphin(), &config, DeterministicRng::new(1));
        assert_eq!(idle.tick(), TickOutcome::TimedOut);
    }

    #[test]
    fn test_shuffle_changes_display_only() {
        let mut round = start(dolphin());
        let before = round.state().display.clone();
        let after = round.shuffle_display().map(str::to_string).unwrap();

        assert_ne!(after, before);
        assert_ne!(normalize(&after), "dolphin");
        assert!(crate::core::text::is_permutation(&after, "dolphin"));
        assert_eq!(round.puzzle().solution(), "Dolphin");
        assert!(matches!(round.submit_guess("dolphin"), GuessOutcome::Correct { .. }));
    }

    #[test]
    fn test_cancel_blocks_late_ticks() {
        let mut round = start(dolphin());
        round.cancel();
        assert_eq!(round.tick(), TickOutcome::Ignored);
        assert_eq!(round.state().remaining_seconds, 30);
        assert_eq!(round.state().outcome, RoundOutcome::Pending);
    }

    proptest! {
        #[test]
        fn prop_scoring_formula(t in 0u32..=30, level in 0u8..3) {
            let hint = match level {
                0 => HintLevel::None,
                1 => HintLevel::TextHint,
                _ => HintLevel::LetterReveal,
            };
            let expected = match hint {
                HintLevel::None => 10 + t,
                HintLevel::TextHint => (10 + t).saturating_sub(3),
                HintLevel::LetterReveal => (10 + t).saturating_sub(5),
            };

            let mut round = RoundController::start(
                dolphin(),
                &RoundConfig { duration_seconds: 30 },
                DeterministicRng::new(u64::from(t)),
            );
            for _ in 0..level {
                round.request_hint();
            }
            for _ in 0..(30 - t) {
                round.tick();
            }

            if t == 0 {
                prop_assert_eq!(round.state().outcome, RoundOutcome::TimedOut);
            } else {
                prop_assert_eq!(round.submit_guess("dolphin"), GuessOutcome::Correct { points: expected });
            }
            prop_assert!(points_for(t, hint) <= 10 + 30);
            prop_assert_eq!(points_for(t, hint), expected);
        }

        #[test]
        fn prop_shuffle_never_repeats_or_solves(seed in any::<u64>(), rounds in 1usize..20) {
            let mut round = RoundController::start(sea_turtle(), &RoundConfig::default(), DeterministicRng::new(seed));
            for _ in 0..rounds {
                let before = round.state().display.clone();
                if let Some(after) = round.shuffle_display().map(str::to_string) {
                    prop_assert_ne!(&after, &before);
                    prop_assert_ne!(normalize(&after), "seaturtle");
                    prop_assert!(crate::core::text::is_permutation(&after, &before));
                }
            }
        }

        #[test]
        fn prop_prefix_survives_any_edit(edit in "\\PC{0,12}") {
            let mut round = start(dolphin());
            round.request_hint();
            round.request_hint();
            round.edit_input(&edit);
            let input = round.state().input.clone();
            prop_assert!(input.to_lowercase().starts_with("dol"));
            if !edit.to_lowercase().starts_with("dol") {
                prop_assert_eq!(input, "Dol");
            }
        }
    }
}
