use serde::{Deserialize, Serialize};

use crate::state::TimerMode;

pub const SETTINGS_KEY: &str = "pomodoro-settings";

/// User-editable timer configuration. Read when a mode is seeded, so edits take
/// effect from the next session onwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimerSettings {
    pub focus_minutes: u32,
    pub short_break_minutes: u32,
    pub long_break_minutes: u32,
    pub auto_start_breaks: bool,
    pub auto_start_focus: bool,
    pub long_break_every_n_sessions: u32,
    pub focus_end_sound_id: String,
    pub break_end_sound_id: String,
    pub volume: f32,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            focus_minutes: 25,
            short_break_minutes: 5,
            long_break_minutes: 15,
            auto_start_breaks: false,
            auto_start_focus: false,
            long_break_every_n_sessions: 4,
            focus_end_sound_id: "bell".into(),
            break_end_sound_id: "chime".into(),
            volume: 0.7,
        }
    }
}

impl TimerSettings {
    pub fn minutes(&self, mode: TimerMode) -> u32 {
        match mode {
            TimerMode::Focus => self.focus_minutes,
            TimerMode::ShortBreak => self.short_break_minutes,
            TimerMode::LongBreak => self.long_break_minutes,
        }
    }

    pub fn duration_secs(&self, mode: TimerMode) -> u64 {
        u64::from(self.minutes(mode)) * 60
    }

    /// Sound played when `mode` runs out.
    pub fn end_sound(&self, mode: TimerMode) -> &str {
        match mode {
            TimerMode::Focus => &self.focus_end_sound_id,
            TimerMode::ShortBreak | TimerMode::LongBreak => &self.break_end_sound_id,
        }
    }

    pub fn auto_start(&self, next: TimerMode) -> bool {
        match next {
            TimerMode::Focus => self.auto_start_focus,
            TimerMode::ShortBreak | TimerMode::LongBreak => self.auto_start_breaks,
        }
    }

    pub fn sanitized(mut self) -> Self {
        self.focus_minutes = self.focus_minutes.clamp(1, 240);
        self.short_break_minutes = self.short_break_minutes.clamp(1, 60);
        self.long_break_minutes = self.long_break_minutes.clamp(1, 120);
        self.long_break_every_n_sessions = self.long_break_every_n_sessions.clamp(1, 12);
        self.volume = if self.volume.is_finite() {
            self.volume.clamp(0.0, 1.0)
        } else {
            1.0
        };
        self
    }
}
