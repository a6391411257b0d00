//! Cancelable one-second countdown.
//!
//! The countdown does not own a clock. Whoever drives the game calls
//! [`Countdown::tick`] once per elapsed second; cancellation is a state
//! change here, so a tick that arrives after `cancel` (or after expiry) is
//! reported as [`CountdownTick::Stopped`] and changes nothing.

use serde::{Serialize, Deserialize};

/// Result of a single tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CountdownTick {
    /// Still running; seconds left after this tick.
    Running(u32),
    /// This tick brought the countdown to zero. Reported exactly once.
    Expired,
    /// Countdown was already cancelled or expired; nothing happened.
    Stopped,
}

/// Countdown lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CountdownState {
    /// Ticking.
    Running,
    /// Stopped by the owner before reaching zero.
    Cancelled,
    /// Reached zero.
    Expired,
}

/// A countdown measured in whole seconds.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Countdown {
    remaining: u32,
    state: CountdownState,
}

impl Countdown {
    /// Start a countdown from `seconds`.
    pub fn start(seconds: u32) -> Self {
        Self {
            remaining: seconds,
            state: CountdownState::Running,
        }
    }

    /// Advance by one second.
    pub fn tick(&mut self) -> CountdownTick {
        if self.state != CountdownState::Running {
            return CountdownTick::Stopped;
        }

        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.state = CountdownState::Expired;
            CountdownTick::Expired
        } else {
            CountdownTick::Running(self.remaining)
        }
    }

    /// Stop the countdown. Idempotent; an expired countdown stays expired.
    pub fn cancel(&mut self) {
        if self.state == CountdownState::Running {
            self.state = CountdownState::Cancelled;
        }
    }

    /// Seconds left.
    #[inline]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Current lifecycle state.
    #[inline]
    pub fn state(&self) -> CountdownState {
        self.state
    }

    /// Whether ticks still have an effect.
    #[inline]
    pub fn is_running(&self) -> bool {
        self.state == CountdownState::Running
    }
}
