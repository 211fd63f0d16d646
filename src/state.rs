use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::settings::TimerSettings;

pub const TIMER_STATE_KEY: &str = "pomodoro-timer-state";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum TimerMode {
    Focus,
    ShortBreak,
    LongBreak,
}

impl Default for TimerMode {
    fn default() -> Self {
        TimerMode::Focus
    }
}

impl TimerMode {
    pub const ALL: [TimerMode; 3] = [TimerMode::Focus, TimerMode::ShortBreak, TimerMode::LongBreak];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Focus => "🎯 FOCUS",
            Self::ShortBreak => "☕ SHORT BREAK",
            Self::LongBreak => "🌴 LONG BREAK",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Focus => "focus",
            Self::ShortBreak => "shortBreak",
            Self::LongBreak => "longBreak",
        }
    }

    pub fn is_break(&self) -> bool {
        !matches!(self, Self::Focus)
    }
}

/// The open focus session. `nominal_start` is kept consistent with the time that
/// has actually been counted down, so whole minutes fall out of `now - nominal_start`
/// regardless of how many pauses happened in between.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusSession {
    pub id: String,
    pub nominal_start: DateTime<Utc>,
    pub committed_minutes: u32,
    pub target_minutes: u32,
    #[serde(default)]
    pub paused_at: Option<DateTime<Utc>>,
}

impl FocusSession {
    pub fn elapsed_whole_minutes(&self, now: DateTime<Utc>) -> u32 {
        let elapsed_ms = (now - self.nominal_start).num_milliseconds().max(0);
        u32::try_from(elapsed_ms / 60_000).unwrap_or(u32::MAX)
    }

    /// Whether focus time exists past the last committed minute.
    pub fn has_uncommitted_time(&self, now: DateTime<Utc>) -> bool {
        let elapsed_ms = (now - self.nominal_start).num_milliseconds();
        elapsed_ms > i64::from(self.committed_minutes) * 60_000
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub mode: TimerMode,
    pub seconds_remaining: u64,
    pub is_running: bool,
    pub target_end: Option<DateTime<Utc>>,
    pub completed_focus_count: u32,
    pub last_completed_mode: Option<TimerMode>,
    #[serde(default)]
    pub session: Option<FocusSession>,
}

impl TimerState {
    pub fn initial(settings: &TimerSettings) -> Self {
        Self {
            mode: TimerMode::Focus,
            seconds_remaining: settings.duration_secs(TimerMode::Focus),
            is_running: false,
            target_end: None,
            completed_focus_count: 0,
            last_completed_mode: None,
            session: None,
        }
    }

    /// `target_end` is present exactly while the clock runs.
    pub fn check_invariant(&self) -> bool {
        self.is_running == self.target_end.is_some()
    }

    /// Seconds left at `now` while running, rounded up so the display never shows
    /// zero before the countdown is over.
    pub fn remaining_at(&self, now: DateTime<Utc>) -> u64 {
        match (self.is_running, self.target_end) {
            (true, Some(end)) => {
                let ms = (end - now).num_milliseconds().max(0);
                u64::try_from((ms + 999) / 1000).unwrap_or(0)
            }
            _ => self.seconds_remaining,
        }
    }

    pub fn progress_ratio(&self, settings: &TimerSettings) -> f64 {
        let total = settings.duration_secs(self.mode) as f64;
        if total <= 0.0 {
            return 0.0;
        }
        (1.0 - self.seconds_remaining as f64 / total).clamp(0.0, 1.0)
    }
}
