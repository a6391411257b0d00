//! Lifetime Stats
//!
//! Folds each finished session's score into a running record that
//! survives restarts. The record is read once when the aggregator is
//! built and written back after every game.

use serde::{Serialize, Deserialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::storage::{StatsStore, StorageError};

/// Cumulative record across sessions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifetimeStats {
    /// Sum of all session scores
    pub total_score: u64,
    /// Sessions finished
    pub games: u64,
    /// `total_score / games`, rounded half-up; 0 with no games
    pub average: u64,
}

impl LifetimeStats {
    /// Record with `score` folded in.
    pub fn with_result(self, score: u32) -> Self {
        let total_score = self.total_score.saturating_add(u64::from(score));
        let games = self.games.saturating_add(1);
        Self {
            total_score,
            games,
            average: rounded_average(total_score, games),
        }
    }

    /// Same totals with the average recomputed from them.
    fn normalized(self) -> Self {
        Self {
            average: rounded_average(self.total_score, self.games),
            ..self
        }
    }
}

/// `round(total / games)` with halves rounded up; 0 when `games == 0`.
pub fn rounded_average(total: u64, games: u64) -> u64 {
    if games == 0 {
        return 0;
    }
    let (total, games) = (u128::from(total), u128::from(games));
    ((2 * total + games) / (2 * games)) as u64
}

/// Player rating for a score or an average.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SkillLevel {
    /// 50 or less
    KeepTrying,
    /// Above 50
    Good,
    /// Above 100
    Excellent,
    /// Above 150
    Genius,
}

impl SkillLevel {
    /// Rate a score.
    pub fn from_score(score: u64) -> Self {
        match score {
            s if s > 150 => SkillLevel::Genius,
            s if s > 100 => SkillLevel::Excellent,
            s if s > 50 => SkillLevel::Good,
            _ => SkillLevel::KeepTrying,
        }
    }

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            SkillLevel::KeepTrying => "Keep Trying!",
            SkillLevel::Good => "Good",
            SkillLevel::Excellent => "Excellent",
            SkillLevel::Genius => "Genius!",
        }
    }
}

/// Stats errors.
#[derive(Debug, Error)]
pub enum StatsError {
    /// The updated record could not be persisted.
    #[error("failed to save lifetime stats: {0}")]
    Storage(#[from] StorageError),

    /// The record could not be encoded.
    #[error("failed to encode lifetime stats: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Aggregator over a [`StatsStore`].
#[derive(Debug)]
pub struct StatsAggregator<S: StatsStore> {
    store: S,
    stats: LifetimeStats,
}

impl<S: StatsStore> StatsAggregator<S> {
    /// Read the stored record.
    ///
    /// Missing, unreadable or unparsable records start from zero. The
    /// average of a parsed record is recomputed from its totals.
    pub fn load(store: S) -> Self {
        let stats = match store.load() {
            Ok(Some(document)) => match serde_json::from_str::<LifetimeStats>(&document) {
                Ok(stats) => {
                    let fixed = stats.normalized();
                    if fixed.average != stats.average {
                        warn!(stored = stats.average, computed = fixed.average, "Stored average corrected");
                    }
                    fixed
                }
                Err(e) => {
                    warn!(error = %e, "Corrupted lifetime stats discarded");
                    LifetimeStats::default()
                }
            },
            Ok(None) => LifetimeStats::default(),
            Err(e) => {
                warn!(error = %e, "Lifetime stats unreadable, starting from zero");
                LifetimeStats::default()
            }
        };

        debug!(games = stats.games, total = stats.total_score, "Lifetime stats loaded");
        Self { store, stats }
    }

    /// Fold a finished session's score in and persist the record.
    ///
    /// The in-memory record is updated even if the write fails.
    pub fn record_game_result(&mut self, score: u32) -> Result<LifetimeStats, StatsError> {
        self.stats = self.stats.with_result(score);
        info!(
            score,
            games = self.stats.games,
            average = self.stats.average,
            "Game recorded"
        );

        let document = serde_json::to_string(&self.stats)?;
        self.store.save(&document)?;
        Ok(self.stats)
    }

    /// Current record.
    pub fn stats(&self) -> LifetimeStats {
        self.stats
    }

    /// Backing store.
    pub fn store(&self) -> &S {
        &self.store
    }
}
