//! Game Engine
//!
//! Composes the session machine, the single active round and the lifetime
//! stats aggregator. All mutation goes through `&mut self`, so whoever
//! owns the engine is the single writer; the async driver in
//! [`crate::runtime`] is one such owner.
//!
//! ## Flow
//!
//! ```text
//! begin_load ──▶ (source) ──▶ finish_load ──▶ RoundStarted
//!                                                  │
//!          tick / submit_guess / hint / shuffle ◀──┘
//!                         │ resolved
//!                         ▼
//!        next round ◀── round_resolved ──▶ Finished ──▶ stats recorded
//! ```

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::core::rng::{derive_session_seed, DeterministicRng};
use crate::game::events::{EventLog, GameEvent, GameEventData, SessionSummary};
use crate::game::puzzle::Puzzle;
use crate::game::round::{
    Feedback, GuessOutcome, HintLevel, InputEdit, RoundConfig, RoundController, TickOutcome,
};
use crate::game::session::{Advance, GamePhase, SessionError, SessionId, SessionMachine};
use crate::game::stats::{LifetimeStats, SkillLevel, StatsAggregator};
use crate::source::{PuzzleSource, SourceError};
use crate::storage::StatsStore;

/// Engine errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Session transition refused.
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// The gameplay engine.
#[derive(Debug)]
pub struct GameEngine<S: StatsStore> {
    session: SessionMachine,
    round: Option<RoundController>,
    stats: StatsAggregator<S>,
    config: RoundConfig,
    base_seed: u64,
    rng: DeterministicRng,
    events: EventLog,
    rounds_started: u64,
    summary: Option<SessionSummary>,
}

impl<S: StatsStore> GameEngine<S> {
    /// Build an engine in `Idle`, loading lifetime stats from `store`.
    pub fn new(config: RoundConfig, store: S, base_seed: u64) -> Self {
        Self {
            session: SessionMachine::new(),
            round: None,
            stats: StatsAggregator::load(store),
            config,
            base_seed,
            rng: DeterministicRng::new(base_seed),
            events: EventLog::new(),
            rounds_started: 0,
            summary: None,
        }
    }

    // =========================================================================
    // LOADING
    // =========================================================================

    /// `Idle -> Loading`. The caller fetches puzzles and reports back
    /// through [`GameEngine::finish_load`].
    pub fn begin_load(&mut self, theme: &str) -> Result<SessionId, EngineError> {
        let session_id = match self.session.start_game(theme) {
            Ok(id) => id,
            Err(e) => {
                self.reject("start_game", &e);
                return Err(e.into());
            }
        };

        let stored_theme = self.session.theme().unwrap_or(theme);
        let seed = derive_session_seed(self.base_seed, &session_id, stored_theme);
        self.rng = DeterministicRng::new(seed);
        self.summary = None;
        self.push_phase(GamePhase::Idle, GamePhase::Loading);
        Ok(session_id)
    }

    /// Deliver the puzzle source's answer. Returns the phase entered.
    pub fn finish_load(
        &mut self,
        result: Result<Vec<Puzzle>, SourceError>,
    ) -> Result<GamePhase, EngineError> {
        let phase = self.session.puzzles_loaded(result)?;

        match phase {
            GamePhase::Playing => {
                self.push_phase(GamePhase::Loading, GamePhase::Playing);
                self.start_round();
            }
            _ => {
                let message = self.session.error().unwrap_or_default().to_string();
                self.events.push(GameEventData::LoadFailed { message });
                self.push_phase(GamePhase::Loading, phase);
            }
        }

        Ok(phase)
    }

    /// Load puzzles from `source` and start playing.
    ///
    /// The engine is borrowed for the whole load, so nothing else can
    /// touch it in the meantime.
    pub async fn start_game<P: PuzzleSource>(
        &mut self,
        source: &P,
        theme: &str,
    ) -> Result<GamePhase, EngineError> {
        self.begin_load(theme)?;
        let theme = self.session.theme().unwrap_or_default().to_string();
        let result = source.generate_puzzles(&theme).await;
        self.finish_load(result)
    }

    // =========================================================================
    // ROUND COMMANDS
    // =========================================================================

    /// One second passed.
    pub fn tick(&mut self) -> TickOutcome {
        let Some(round) = self.round.as_mut() else {
            return TickOutcome::Ignored;
        };

        let outcome = round.tick();
        match outcome {
            TickOutcome::Running { remaining } => {
                self.events.push(GameEventData::Tick { remaining });
            }
            TickOutcome::TimedOut => {
                self.events.push(GameEventData::Tick { remaining: 0 });
                self.resolve_round();
            }
            TickOutcome::Ignored => {}
        }
        outcome
    }

    /// Check a guess against the current puzzle.
    pub fn submit_guess(&mut self, text: &str) -> GuessOutcome {
        let Some(round) = self.active_round("submit_guess") else {
            return GuessOutcome::Ignored;
        };

        let outcome = round.submit_guess(text);
        match &outcome {
            GuessOutcome::Correct { .. } => {
                self.events.push(GameEventData::GuessChecked {
                    feedback: Feedback::Correct,
                    input: text.to_string(),
                });
                self.resolve_round();
            }
            GuessOutcome::Incorrect { input } => {
                self.events.push(GameEventData::GuessChecked {
                    feedback: Feedback::Incorrect,
                    input: input.clone(),
                });
            }
            GuessOutcome::PrefixViolation { input } => {
                self.events.push(GameEventData::GuessChecked {
                    feedback: Feedback::Incorrect,
                    input: input.clone(),
                });
                self.events.push(GameEventData::InputReset {
                    input: input.clone(),
                });
            }
            GuessOutcome::Ignored => {}
        }
        outcome
    }

    /// Submit the input buffer as a guess.
    pub fn submit_input(&mut self) -> GuessOutcome {
        let text = match self.round.as_ref() {
            Some(round) => round.state().input.clone(),
            None => String::new(),
        };
        self.submit_guess(&text)
    }

    /// Replace the input buffer.
    pub fn edit_input(&mut self, text: &str) -> InputEdit {
        let Some(round) = self.active_round("edit_input") else {
            return InputEdit::Ignored;
        };

        let edit = round.edit_input(text);
        if let InputEdit::Reset { input } = &edit {
            self.events.push(GameEventData::InputReset {
                input: input.clone(),
            });
        }
        edit
    }

    /// Climb the hint ladder.
    pub fn request_hint(&mut self) -> HintLevel {
        let Some(round) = self.active_round("request_hint") else {
            return HintLevel::None;
        };

        let before = round.state().hint_level;
        let level = round.request_hint();
        if level != before {
            let hint = round.visible_hint().map(str::to_string);
            let prefix = round.state().reveal_prefix.clone();
            self.events.push(GameEventData::HintShown { level, hint, prefix });
        }
        level
    }

    /// Re-scramble the jumble. `None` when nothing changed.
    pub fn shuffle(&mut self) -> Option<String> {
        let round = self.active_round("shuffle")?;

        let display = round.shuffle_display()?.to_string();
        self.events.push(GameEventData::Shuffled {
            display: display.clone(),
        });
        Some(display)
    }

    // =========================================================================
    // SESSION COMMANDS
    // =========================================================================

    /// Discard the session and return to `Idle`.
    pub fn restart(&mut self) -> Result<(), EngineError> {
        let from = self.session.phase();
        if let Err(e) = self.session.restart() {
            self.reject("restart", &e);
            return Err(e.into());
        }

        if let Some(mut round) = self.round.take() {
            round.cancel();
        }
        self.summary = None;

        if from != GamePhase::Idle {
            self.push_phase(from, GamePhase::Idle);
        }
        Ok(())
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    fn start_round(&mut self) {
        let Some(puzzle) = self.session.current_puzzle().cloned() else {
            error!(index = self.session.index(), "Playing without a current puzzle");
            return;
        };

        if let Some(mut old) = self.round.take() {
            old.cancel();
        }

        let round = RoundController::start(puzzle, &self.config, self.rng.fork());
        self.rounds_started += 1;
        self.events.push(GameEventData::RoundStarted {
            index: self.session.index(),
            total: self.session.puzzles().len(),
            display: round.state().display.clone(),
            word_count: round.puzzle().word_count(),
            seconds: round.state().remaining_seconds,
        });
        self.round = Some(round);
    }

    fn resolve_round(&mut self) {
        let Some(mut round) = self.round.take() else {
            return;
        };
        let Some(resolution) = round.resolution() else {
            self.round = Some(round);
            return;
        };
        round.cancel();

        let index = self.session.index();
        let advance = match self.session.round_resolved(resolution) {
            Ok(advance) => advance,
            Err(e) => {
                error!(error = %e, "Round resolution rejected");
                return;
            }
        };

        self.events.push(GameEventData::RoundResolved {
            index,
            resolution,
            solution: round.puzzle().solution().to_string(),
            score: self.session.score(),
        });

        match advance {
            Advance::NextPuzzle(_) => self.start_round(),
            Advance::Finished => self.finish_session(),
        }
    }

    fn finish_session(&mut self) {
        self.push_phase(GamePhase::Playing, GamePhase::Finished);

        let score = self.session.score();
        let saved = match self.stats.record_game_result(score) {
            Ok(_) => true,
            Err(e) => {
                error!(error = %e, "Lifetime stats not saved");
                false
            }
        };
        let lifetime = self.stats.stats();
        self.events.push(GameEventData::StatsUpdated { stats: lifetime, saved });

        let summary = SessionSummary {
            session_id: self
                .session
                .session_id()
                .map(hex::encode)
                .unwrap_or_default(),
            theme: self.session.theme().unwrap_or_default().to_string(),
            score,
            correct: self.session.correct_count(),
            total: self.session.puzzles().len(),
            missed: self.session.missed().to_vec(),
            skill: SkillLevel::from_score(u64::from(score)),
            lifetime,
            overall_skill: SkillLevel::from_score(lifetime.average),
            finished_at: chrono::Utc::now(),
        };
        info!(
            session = %summary.session_id,
            score,
            missed = summary.missed.len(),
            "Session summary ready"
        );

        self.events.push(GameEventData::SessionFinished {
            summary: summary.clone(),
        });
        self.summary = Some(summary);
    }

    /// The round, if commands may reach it; otherwise records a rejection.
    fn active_round(&mut self, command: &str) -> Option<&mut RoundController> {
        let phase = self.session.phase();
        if phase != GamePhase::Playing || self.round.is_none() {
            let reason = match phase {
                GamePhase::Loading => "puzzles are still loading",
                _ => "no round in play",
            };
            debug!(command, phase = phase.as_str(), "Command rejected");
            self.events.push(GameEventData::CommandRejected {
                command: command.to_string(),
                reason: reason.to_string(),
            });
            return None;
        }
        self.round.as_mut()
    }

    fn reject(&mut self, command: &str, err: &SessionError) {
        warn!(command, error = %err, "Command rejected");
        self.events.push(GameEventData::CommandRejected {
            command: command.to_string(),
            reason: err.to_string(),
        });
    }

    fn push_phase(&mut self, from: GamePhase, to: GamePhase) {
        self.events.push(GameEventData::PhaseChanged { from, to });
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    /// Current phase.
    pub fn phase(&self) -> GamePhase {
        self.session.phase()
    }

    /// Session state.
    pub fn session(&self) -> &SessionMachine {
        &self.session
    }

    /// Round in play, if any.
    pub fn round(&self) -> Option<&RoundController> {
        self.round.as_ref()
    }

    /// Lifetime record.
    pub fn lifetime_stats(&self) -> LifetimeStats {
        self.stats.stats()
    }

    /// Summary of the finished session, while `Finished`.
    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    /// Round settings.
    pub fn config(&self) -> &RoundConfig {
        &self.config
    }

    /// Rounds started since the engine was built.
    pub fn rounds_started(&self) -> u64 {
        self.rounds_started
    }

    /// Drain buffered events, oldest first.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        self.events.drain()
    }
}
