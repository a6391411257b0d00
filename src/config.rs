//! Runtime configuration.
//!
//! Every setting has a default and can be overridden from the
//! environment. A malformed value is logged and ignored.

use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

use crate::core::rng::entropy_seed;
use crate::game::round::RoundConfig;
use crate::ROUND_DURATION_SECONDS;

/// Default stats file, relative to the working directory.
pub const DEFAULT_STATS_PATH: &str = "word_jumble_stats.json";

/// Default tick period.
pub const DEFAULT_TICK_MILLIS: u64 = 1000;

/// Game configuration.
#[derive(Clone, Debug)]
pub struct GameConfig {
    /// Countdown length per round.
    pub round_seconds: u32,
    /// Lifetime stats file.
    pub stats_path: PathBuf,
    /// Puzzle pack file. `None` uses the built-in pack.
    pub puzzle_pack: Option<PathBuf>,
    /// Base seed for shuffles and theme suggestions.
    pub seed: u64,
    /// Real time between ticks. One tick is one game second.
    pub tick_period: Duration,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            round_seconds: ROUND_DURATION_SECONDS,
            stats_path: PathBuf::from(DEFAULT_STATS_PATH),
            puzzle_pack: None,
            seed: entropy_seed(),
            tick_period: Duration::from_millis(DEFAULT_TICK_MILLIS),
        }
    }
}

impl GameConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            round_seconds: parse_or("JUMBLE_ROUND_SECONDS", &lookup, defaults.round_seconds),
            stats_path: lookup("JUMBLE_STATS_PATH")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.stats_path),
            puzzle_pack: lookup("JUMBLE_PUZZLE_PACK")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            seed: parse_or("JUMBLE_SEED", &lookup, defaults.seed),
            tick_period: match parse_or("JUMBLE_TICK_MILLIS", &lookup, DEFAULT_TICK_MILLIS) {
                0 => {
                    warn!("JUMBLE_TICK_MILLIS must be positive, using default");
                    defaults.tick_period
                }
                millis => Duration::from_millis(millis),
            },
        }
    }

    /// Round settings derived from this config.
    pub fn round_config(&self) -> RoundConfig {
        RoundConfig {
            duration_seconds: self.round_seconds,
        }
    }
}

fn parse_or<T, F>(key: &str, lookup: &F, default: T) -> T
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                warn!(key, value = %raw, "Ignoring unparsable setting");
                default
            }
        },
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> GameConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        GameConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[]);
        assert_eq!(cfg.round_seconds, 30);
        assert_eq!(cfg.stats_path, PathBuf::from("word_jumble_stats.json"));
        assert_eq!(cfg.puzzle_pack, None);
        assert_eq!(cfg.tick_period, Duration::from_secs(1));
        assert_eq!(cfg.round_config(), RoundConfig::default());
    }

    #[test]
    fn test_overrides() {
        let cfg = config(&[
            ("JUMBLE_ROUND_SECONDS", "45"),
            ("JUMBLE_STATS_PATH", "/tmp/stats.json"),
            ("JUMBLE_PUZZLE_PACK", "pack.json"),
            ("JUMBLE_SEED", " 1234 "),
            ("JUMBLE_TICK_MILLIS", "250"),
        ]);
        assert_eq!(cfg.round_config().duration_seconds, 45);
        assert_eq!(cfg.stats_path, PathBuf::from("/tmp/stats.json"));
        assert_eq!(cfg.puzzle_pack, Some(PathBuf::from("pack.json")));
        assert_eq!(cfg.seed, 1234);
        assert_eq!(cfg.tick_period, Duration::from_millis(250));
    }

    #[test]
    fn test_bad_values_fall_back() {
        let cfg = config(&[
            ("JUMBLE_ROUND_SECONDS", "forever"),
            ("JUMBLE_TICK_MILLIS", "0"),
            ("JUMBLE_STATS_PATH", "  "),
        ]);
        assert_eq!(cfg.round_seconds, 30);
        assert_eq!(cfg.tick_period, Duration::from_secs(1));
        assert_eq!(cfg.stats_path, PathBuf::from(DEFAULT_STATS_PATH));
    }
}
