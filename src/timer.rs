//! Countdown timer.
//! Remaining time comes from the snapshot's start timestamp and limit; no local clock
//! state is kept between ticks.

use crate::model::{GameState, GameStatus};
use std::time::{SystemTime, UNIX_EPOCH};

pub const PLACEHOLDER: &str = "--:--";
const WARNING_SECS: u64 = 180;
const DANGER_SECS: u64 = 60;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Urgency {
    #[default]
    Normal,
    Warning,
    Danger,
}

impl Urgency {
    pub fn classify(remaining: u64) -> Self {
        if remaining <= DANGER_SECS {
            Urgency::Danger
        } else if remaining <= WARNING_SECS {
            Urgency::Warning
        } else {
            Urgency::Normal
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Urgency::Normal => "timer",
            Urgency::Warning => "timer warning",
            Urgency::Danger => "timer danger",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimerReading {
    pub text: String,
    pub urgency: Urgency,
    /// `None` when the game has no time limit.
    pub remaining: Option<u64>,
}

impl TimerReading {
    pub fn placeholder() -> Self {
        TimerReading {
            text: PLACEHOLDER.to_string(),
            urgency: Urgency::Normal,
            remaining: None,
        }
    }
}

/// `MM:SS`, minutes keep counting past 59.
pub fn format_time(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Whole seconds left, clamped at zero. `None` for unlimited games or before the
/// server has stamped a start time.
pub fn remaining_seconds(state: &GameState, now: i64) -> Option<u64> {
    let limit = state.time_limit_minutes();
    if limit == 0 {
        return None;
    }
    let started_at = state.started_at?;
    let elapsed = (now - started_at).max(0);
    let remaining = i64::from(limit) * 60 - elapsed;
    Some(remaining.max(0) as u64)
}

pub fn read_timer(state: Option<&GameState>, now: i64) -> TimerReading {
    match state.and_then(|s| remaining_seconds(s, now)) {
        Some(remaining) => TimerReading {
            text: format_time(remaining),
            urgency: Urgency::classify(remaining),
            remaining: Some(remaining),
        },
        None => TimerReading::placeholder(),
    }
}

/// True once a running game's clock has hit zero.
pub fn has_expired(state: &GameState, now: i64) -> bool {
    state.status == GameStatus::Running && remaining_seconds(state, now) == Some(0)
}

pub fn now_epoch() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
