use crate::{settings::TimerSettings, state::TimerMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub next_mode: TimerMode,
    pub duration_secs: u64,
    pub auto_start: bool,
}

/// Decides what follows `just_completed`. `completed_focus_count` already includes
/// the session that just finished when that session was a focus block.
pub fn next_transition(
    just_completed: TimerMode,
    completed_focus_count: u32,
    settings: &TimerSettings,
) -> Transition {
    let next_mode = match just_completed {
        TimerMode::Focus => {
            let every = settings.long_break_every_n_sessions.max(1);
            if completed_focus_count % every == 0 {
                TimerMode::LongBreak
            } else {
                TimerMode::ShortBreak
            }
        }
        TimerMode::ShortBreak | TimerMode::LongBreak => TimerMode::Focus,
    };

    Transition {
        next_mode,
        duration_secs: settings.duration_secs(next_mode),
        auto_start: settings.auto_start(next_mode),
    }
}
