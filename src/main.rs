//! Word Jumble
//!
//! Terminal frontend: type a theme to start, then type guesses.
//! `/hint`, `/shuffle`, `/restart`, `/themes` and `/quit` are commands.

use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use word_jumble::{
    Command, DeterministicRng, GameConfig, GameDriver, GameEngine, JsonFileStore,
    PuzzlePackSource, VERSION,
    game::events::{GameEvent, GameEventData},
    game::round::{Feedback, RoundResolution},
    source::{suggest_themes, SUGGESTION_COUNT},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = GameConfig::from_env();
    info!("Word Jumble v{}", VERSION);
    info!(
        round_seconds = config.round_seconds,
        stats = %config.stats_path.display(),
        "Configuration loaded"
    );

    let pack = match &config.puzzle_pack {
        Some(path) => PuzzlePackSource::from_file(path)
            .with_context(|| format!("loading puzzle pack {}", path.display()))?,
        None => PuzzlePackSource::builtin().context("loading built-in puzzle pack")?,
    };
    let themes: Vec<String> = pack.themes().into_iter().map(str::to_string).collect();

    let store = JsonFileStore::new(config.stats_path.clone());
    let engine = GameEngine::new(config.round_config(), store, config.seed);
    let lifetime = engine.lifetime_stats();
    if lifetime.games > 0 {
        println!(
            "Welcome back! {} games played, average score {}.",
            lifetime.games, lifetime.average
        );
    }

    let (driver, handle) = GameDriver::new(engine, Arc::new(pack), config.tick_period);
    let printer = tokio::spawn(print_events(handle.subscribe()));
    let driver_task = driver.spawn();

    let mut rng = DeterministicRng::new(config.seed);
    print_themes(&themes, &mut rng);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        let line = line.trim();
        let command = match line {
            "" => continue,
            "/quit" => break,
            "/hint" => Command::Hint,
            "/shuffle" => Command::Shuffle,
            "/restart" => Command::Restart,
            "/themes" => {
                print_themes(&themes, &mut rng);
                continue;
            }
            text => Command::Enter(text.to_string()),
        };

        if handle.send(command).await.is_err() {
            warn!("Game driver stopped unexpectedly");
            break;
        }
    }

    // The driver may already be gone after a failure above
    let _ = handle.shutdown().await;
    let engine = driver_task.await.context("game driver panicked")?;
    drop(handle);
    printer.abort();

    let stats = engine.lifetime_stats();
    info!(games = stats.games, average = stats.average, "Goodbye");
    Ok(())
}

fn print_themes(pack_themes: &[String], rng: &mut DeterministicRng) {
    println!("Themes with puzzles ready: {}", pack_themes.join(", "));
    println!(
        "Ideas: {}",
        suggest_themes(rng, SUGGESTION_COUNT).join(", ")
    );
    println!("Type a theme to start.");
}

async fn print_events(mut events: broadcast::Receiver<GameEvent>) {
    loop {
        let event = match events.recv().await {
            Ok(event) => event,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "Event printer fell behind");
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => break,
        };

        match event.data {
            GameEventData::LoadFailed { message } => println!("{message}"),
            GameEventData::CommandRejected { reason, .. } => println!("({reason})"),
            GameEventData::RoundStarted { index, total, display, word_count, seconds } => {
                let words = if word_count == 1 { "word" } else { "words" };
                println!();
                println!("Puzzle {}/{}: {display}  ({word_count} {words}, {seconds}s)", index + 1, total);
            }
            GameEventData::Tick { remaining } if remaining > 0 && remaining % 10 == 0 => {
                println!("{remaining}s left");
            }
            GameEventData::Tick { remaining } if (1..=5).contains(&remaining) => {
                println!("{remaining}...");
            }
            GameEventData::GuessChecked { feedback, input } => match feedback {
                Feedback::Incorrect if input.is_empty() => {
                    println!("Not quite, try again.")
                }
                Feedback::Incorrect => {
                    println!("Not quite, try again. Input: {input}")
                }
                _ => {}
            },
            GameEventData::InputReset { input } => println!("Keep the revealed letters: {input}"),
            GameEventData::HintShown { hint, prefix, .. } => {
                if let Some(prefix) = prefix {
                    println!("First letters: {prefix}");
                } else if let Some(hint) = hint {
                    println!("Hint: {hint}");
                }
            }
            GameEventData::Shuffled { display } => println!("Shuffled: {display}"),
            GameEventData::RoundResolved { resolution, solution, score, .. } => match resolution {
                RoundResolution::Correct { points } => {
                    println!("Correct! +{points} (score {score})")
                }
                RoundResolution::TimedOut => println!("Time's up! It was {solution}."),
            },
            GameEventData::SessionFinished { summary } => {
                println!();
                println!(
                    "Game over: {} points, {}/{} solved. {}",
                    summary.score,
                    summary.correct,
                    summary.total,
                    summary.skill.label()
                );
                for puzzle in &summary.missed {
                    println!("  missed: {} ({})", puzzle.solution(), puzzle.hint());
                }
                println!(
                    "Lifetime: {} games, {} total, average {} ({}).",
                    summary.lifetime.games,
                    summary.lifetime.total_score,
                    summary.lifetime.average,
                    summary.overall_skill.label()
                );
                println!("Type a theme to play again, or /quit.");
            }
            GameEventData::StatsUpdated { saved: false, .. } => {
                println!("(Couldn't save your stats; they'll be kept for this run.)")
            }
            _ => {}
        }
    }
}
