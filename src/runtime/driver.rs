//! Game Driver
//!
//! Owns a [`GameEngine`] on a tokio task and serializes everything that
//! can touch it: player commands, the one-second tick and the puzzle load.
//! Commands come in over an `mpsc` channel; engine events go out on a
//! `broadcast` channel.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, instrument, warn};

use crate::game::engine::GameEngine;
use crate::game::events::GameEvent;
use crate::game::puzzle::Puzzle;
use crate::game::session::GamePhase;
use crate::source::{PuzzleSource, SourceError};
use crate::storage::StatsStore;

/// Command channel depth.
const COMMAND_BUFFER: usize = 32;

/// Event channel depth. Slow subscribers lag rather than block the game.
const EVENT_BUFFER: usize = 256;

type PendingLoad = Pin<Box<dyn Future<Output = Result<Vec<Puzzle>, SourceError>> + Send>>;

/// Player commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Start a game with this theme.
    StartGame(String),
    /// A line of text: a theme when no game is on, a guess otherwise.
    Enter(String),
    /// Replace the input buffer.
    Input(String),
    /// Submit the input buffer.
    Submit,
    /// Next hint.
    Hint,
    /// Re-scramble the jumble.
    Shuffle,
    /// Abandon or leave the current session.
    Restart,
    /// Stop the driver.
    Shutdown,
}

/// Driver errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    /// The driver task has stopped.
    #[error("game driver is not running")]
    Closed,
}

/// Cloneable handle for talking to a running driver.
#[derive(Clone, Debug)]
pub struct DriverHandle {
    commands: mpsc::Sender<Command>,
    events: broadcast::Sender<GameEvent>,
}

impl DriverHandle {
    /// Queue a command.
    pub async fn send(&self, command: Command) -> Result<(), DriverError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| DriverError::Closed)
    }

    /// Receive events emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.events.subscribe()
    }

    /// Ask the driver to stop.
    pub async fn shutdown(&self) -> Result<(), DriverError> {
        self.send(Command::Shutdown).await
    }
}

/// Single-writer loop around a [`GameEngine`].
pub struct GameDriver<P, S: StatsStore> {
    engine: GameEngine<S>,
    source: Arc<P>,
    commands: mpsc::Receiver<Command>,
    events: broadcast::Sender<GameEvent>,
    tick_period: Duration,
}

impl<P, S> GameDriver<P, S>
where
    P: PuzzleSource + 'static,
    S: StatsStore + 'static,
{
    /// Wrap an engine. Nothing runs until [`GameDriver::run`] or
    /// [`GameDriver::spawn`].
    pub fn new(engine: GameEngine<S>, source: Arc<P>, tick_period: Duration) -> (Self, DriverHandle) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (event_tx, _) = broadcast::channel(EVENT_BUFFER);

        let driver = Self {
            engine,
            source,
            commands: command_rx,
            events: event_tx.clone(),
            tick_period,
        };
        let handle = DriverHandle {
            commands: command_tx,
            events: event_tx,
        };
        (driver, handle)
    }

    /// Run on a new tokio task. The task yields the engine when it stops.
    pub fn spawn(self) -> JoinHandle<GameEngine<S>> {
        tokio::spawn(self.run())
    }

    /// Process commands, ticks and loads until shutdown or until every
    /// handle is dropped.
    #[instrument(skip(self))]
    pub async fn run(mut self) -> GameEngine<S> {
        let period = self.tick_period;
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut pending: Option<PendingLoad> = None;
        let mut rounds_seen = self.engine.rounds_started();

        info!(tick_ms = period.as_millis() as u64, "Game driver started");

        loop {
            let ticking = self.engine.round().is_some_and(|r| r.is_ticking());

            tokio::select! {
                command = self.commands.recv() => {
                    match command {
                        Some(Command::Shutdown) | None => {
                            if pending.is_some() {
                                info!("Dropping in-flight puzzle load");
                            }
                            break;
                        }
                        Some(command) => self.handle_command(command, &mut pending),
                    }
                }
                Some(result) = async {
                    match pending.as_mut() {
                        Some(load) => Some(load.await),
                        None => None,
                    }
                }, if pending.is_some() => {
                    pending = None;
                    if let Err(e) = self.engine.finish_load(result) {
                        warn!(error = %e, "Puzzle load arrived out of phase");
                    }
                }
                _ = ticker.tick(), if ticking => {
                    self.engine.tick();
                }
            }

            // Each round gets a full first second
            let rounds = self.engine.rounds_started();
            if rounds != rounds_seen {
                rounds_seen = rounds;
                ticker.reset();
            }

            self.publish();
        }

        self.publish();
        info!("Game driver stopped");
        self.engine
    }

    fn handle_command(&mut self, command: Command, pending: &mut Option<PendingLoad>) {
        debug!(?command, phase = self.engine.phase().as_str(), "Command");

        match command {
            Command::StartGame(theme) => self.start_load(&theme, pending),
            Command::Enter(text) => match self.engine.phase() {
                GamePhase::Idle | GamePhase::Finished => self.start_load(&text, pending),
                GamePhase::Loading | GamePhase::Playing => {
                    self.engine.submit_guess(&text);
                }
            },
            Command::Input(text) => {
                self.engine.edit_input(&text);
            }
            Command::Submit => {
                self.engine.submit_input();
            }
            Command::Hint => {
                self.engine.request_hint();
            }
            Command::Shuffle => {
                self.engine.shuffle();
            }
            Command::Restart => {
                // Rejections are reported as events
                let _ = self.engine.restart();
            }
            // Handled by the run loop
            Command::Shutdown => {}
        }
    }

    fn start_load(&mut self, theme: &str, pending: &mut Option<PendingLoad>) {
        if self.engine.phase() == GamePhase::Finished && self.engine.restart().is_err() {
            return;
        }
        if self.engine.begin_load(theme).is_err() {
            return;
        }

        let source = Arc::clone(&self.source);
        let theme = self.engine.session().theme().unwrap_or_default().to_string();
        *pending = Some(Box::pin(async move { source.generate_puzzles(&theme).await }));
    }

    fn publish(&mut self) {
        for event in self.engine.take_events() {
            // No subscribers is fine
            let _ = self.events.send(event);
        }
    }
}
