//! Mute gate for chat notifications.
//!
//! While muted, the dispatcher drops mutable notifications. Each mute bumps a
//! generation so a delayed auto-unmute only fires for the mute that armed it.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid duration \"{input}\"")]
pub struct MuteDurationError {
    pub input: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Public struct `MuteTicket` used across Herald components.
pub struct MuteTicket {
    pub until: DateTime<Utc>,
    pub generation: u64,
}

#[derive(Debug, Default)]
struct MuteState {
    until: Option<DateTime<Utc>>,
    generation: u64,
}

#[derive(Debug, Default)]
/// Public struct `MuteGate` used across Herald components.
pub struct MuteGate {
    state: Mutex<MuteState>,
}

impl MuteGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mute(&self, duration: Duration, now: DateTime<Utc>) -> MuteTicket {
        let until = chrono::Duration::from_std(duration)
            .ok()
            .and_then(|delta| now.checked_add_signed(delta))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let mut state = lock_or_recover(&self.state);
        state.until = Some(until);
        state.generation += 1;
        MuteTicket {
            until,
            generation: state.generation,
        }
    }

    /// Clears any mute. Returns whether a mute was set.
    pub fn unmute(&self) -> bool {
        let mut state = lock_or_recover(&self.state);
        state.until.take().is_some()
    }

    /// Clears the mute only if no newer mute replaced `generation`.
    pub fn unmute_if_current(&self, generation: u64) -> bool {
        let mut state = lock_or_recover(&self.state);
        if state.generation != generation || state.until.is_none() {
            return false;
        }
        state.until = None;
        true
    }

    pub fn is_muted(&self, now: DateTime<Utc>) -> bool {
        lock_or_recover(&self.state)
            .until
            .is_some_and(|until| now < until)
    }
}

/// Parses durations such as `90s`, `5m`, `1h30m` or `2h 15m`.
///
/// A bare `0` means no delay; every other value needs a unit.
pub fn parse_mute_duration(raw: &str) -> Result<Duration, MuteDurationError> {
    let text = raw.trim();
    if text == "0" {
        return Ok(Duration::ZERO);
    }
    humantime::parse_duration(text).map_err(|_| MuteDurationError {
        input: text.to_string(),
    })
}

fn lock_or_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
