use chrono::{DateTime, TimeDelta, Utc};
use log::{debug, info, warn};
use uuid::Uuid;

use crate::{
    alerts::Alerts,
    clock::Clock,
    minute_log::{self, FocusMinuteLog},
    policy::next_transition,
    settings::TimerSettings,
    state::{FocusSession, TimerMode, TimerState},
    store::FocusLogSink,
};

/// The Pomodoro state machine. Owns the timer state and appends to `log` every
/// time a whole minute of focus has been counted down.
pub struct FocusTimer<C, L, A> {
    clock: C,
    log: L,
    alerts: A,
    settings: TimerSettings,
    state: TimerState,
}

impl<C: Clock, L: FocusLogSink, A: Alerts> FocusTimer<C, L, A> {
    pub fn new(clock: C, log: L, alerts: A, settings: TimerSettings) -> Self {
        let settings = settings.sanitized();
        let state = TimerState::initial(&settings);
        Self {
            clock,
            log,
            alerts,
            settings,
            state,
        }
    }

    /// Rebuilds the timer from a persisted snapshot and reconciles it against the
    /// current time, so an overdue countdown completes straight away.
    pub fn restore(clock: C, log: L, alerts: A, settings: TimerSettings, snapshot: TimerState) -> Self {
        let mut timer = Self::new(clock, log, alerts, settings);
        let now = timer.clock.now();
        timer.state = repair(snapshot, &timer.settings, now);
        timer.tick_at(now);
        timer
    }

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn settings(&self) -> &TimerSettings {
        &self.settings
    }

    pub fn log(&self) -> &L {
        &self.log
    }

    pub fn log_mut(&mut self) -> &mut L {
        &mut self.log
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running
    }

    pub fn mode(&self) -> TimerMode {
        self.state.mode
    }

    /// Starts or resumes the countdown. Returns `false` when already running.
    pub fn start(&mut self) -> bool {
        if self.state.is_running {
            debug!("start ignored: timer already running");
            return false;
        }

        let now = self.clock.now();
        if self.state.seconds_remaining == 0 {
            self.state.seconds_remaining = self.settings.duration_secs(self.state.mode);
        }

        let target_end = match now.checked_add_signed(secs(self.state.seconds_remaining)) {
            Some(end) => end,
            None => {
                warn!(
                    "Remaining time {}s is out of range; reseeding {}",
                    self.state.seconds_remaining,
                    self.state.mode.as_str()
                );
                self.state.seconds_remaining = self.settings.duration_secs(self.state.mode);
                now + secs(self.state.seconds_remaining)
            }
        };

        let remaining = self.state.seconds_remaining;
        self.state.is_running = true;
        self.state.target_end = Some(target_end);

        if self.state.mode == TimerMode::Focus {
            self.open_session(now, remaining);
        }

        info!(
            "Started {} with {}s remaining",
            self.state.mode.as_str(),
            remaining
        );
        true
    }

    /// Freezes the countdown. Returns `false` when not running.
    pub fn pause(&mut self) -> bool {
        if !self.state.is_running {
            debug!("pause ignored: timer not running");
            return false;
        }

        let now = self.clock.now();
        self.state.seconds_remaining = self.state.remaining_at(now);
        if self.state.seconds_remaining == 0 {
            self.tick_at(now);
            return true;
        }

        if self.state.mode == TimerMode::Focus {
            self.commit_elapsed(now);
            if let Some(session) = self.state.session.as_mut() {
                session.paused_at = Some(now);
            }
        }

        self.state.is_running = false;
        self.state.target_end = None;
        info!(
            "Paused {} at {}s remaining",
            self.state.mode.as_str(),
            self.state.seconds_remaining
        );
        true
    }

    pub fn toggle(&mut self) {
        if self.state.is_running {
            self.pause();
        } else {
            self.start();
        }
    }

    /// Recomputes the remaining time, commits whole focus minutes and completes the
    /// countdown once it reaches zero. A no-op while paused.
    pub fn tick(&mut self) {
        let now = self.clock.now();
        self.tick_at(now);
    }

    fn tick_at(&mut self, now: DateTime<Utc>) {
        if !self.state.is_running {
            return;
        }

        self.state.seconds_remaining = self.state.remaining_at(now);
        if self.state.mode == TimerMode::Focus {
            self.commit_elapsed(now);
        }

        if self.state.seconds_remaining == 0 {
            self.complete(now);
        }
    }

    /// Manual mode switch: stops the clock, closes any open focus session and
    /// seeds the full duration of `mode`.
    pub fn switch_mode(&mut self, mode: TimerMode) {
        let now = self.clock.now();
        if self.state.is_running && self.state.mode == TimerMode::Focus {
            self.commit_elapsed(now);
        }
        self.abandon_session(now);

        self.state.is_running = false;
        self.state.target_end = None;
        self.state.mode = mode;
        self.state.seconds_remaining = self.settings.duration_secs(mode);
        info!("Switched to {}", mode.as_str());
    }

    pub fn reset(&mut self) {
        self.switch_mode(self.state.mode);
    }

    /// Stores new settings. An idle timer with no open session picks up the new
    /// duration immediately; otherwise it applies from the next mode onwards.
    pub fn update_settings(&mut self, settings: TimerSettings) {
        self.settings = settings.sanitized();
        if !self.state.is_running && self.state.session.is_none() {
            self.state.seconds_remaining = self.settings.duration_secs(self.state.mode);
        }
    }

    fn open_session(&mut self, now: DateTime<Utc>, remaining: u64) {
        match self.state.session.as_mut() {
            Some(session) => match session.paused_at.take() {
                Some(paused_at) => {
                    let paused_for = (now - paused_at).max(TimeDelta::zero());
                    session.nominal_start = session
                        .nominal_start
                        .checked_add_signed(paused_for)
                        .unwrap_or(now);
                    debug!("Resumed session {} after {}s", session.id, paused_for.num_seconds());
                }
                None => {
                    let counted = counted_down(session.target_minutes, remaining);
                    session.nominal_start = backdate(now, counted);
                }
            },
            None => {
                let target_minutes = self.settings.focus_minutes;
                let counted = counted_down(target_minutes, remaining);
                let nominal_start = backdate(now, counted);
                let mut session = FocusSession {
                    id: Uuid::new_v4().to_string(),
                    nominal_start,
                    committed_minutes: 0,
                    target_minutes,
                    paused_at: None,
                };
                // Time counted down before the session existed is not re-awarded.
                session.committed_minutes = session
                    .elapsed_whole_minutes(now)
                    .min(target_minutes.saturating_sub(1));
                info!("Opened focus session {}", session.id);
                self.state.session = Some(session);
            }
        }
    }

    fn commit_elapsed(&mut self, now: DateTime<Utc>) {
        let entries = match self.state.session.as_mut() {
            Some(session) => {
                let elapsed = session.elapsed_whole_minutes(now);
                let entries = minute_log::elapsed_entries(session, elapsed);
                session.committed_minutes += entries.len() as u32;
                entries
            }
            None => return,
        };
        self.append(entries);
    }

    fn abandon_session(&mut self, now: DateTime<Utc>) {
        let Some(session) = self.state.session.take() else {
            return;
        };

        // Time spent paused is not focus time.
        let until = session.paused_at.unwrap_or(now);
        let entries = minute_log::abandonment_entries(&session, until);
        info!(
            "Abandoned focus session {} after {} committed minutes",
            session.id,
            session.committed_minutes + entries.len() as u32
        );
        self.append(entries);
    }

    fn complete(&mut self, now: DateTime<Utc>) {
        let finished = self.state.mode;
        self.state.is_running = false;
        self.state.target_end = None;
        self.state.seconds_remaining = 0;

        if finished == TimerMode::Focus {
            if let Some(session) = self.state.session.take() {
                let entries = minute_log::completion_entries(&session);
                if !entries.iter().any(|e| e.is_final_minute_of_session) {
                    warn!("Session {} completed without a final minute", session.id);
                }
                self.append(entries);
            }
            self.state.completed_focus_count += 1;
        }
        self.state.last_completed_mode = Some(finished);

        let transition = next_transition(finished, self.state.completed_focus_count, &self.settings);
        info!(
            "Completed {} at {}; next {}",
            finished.as_str(),
            now.to_rfc3339(),
            transition.next_mode.as_str()
        );

        let sound = self.settings.end_sound(finished).to_string();
        self.alerts.play_sound(&sound, self.settings.volume);
        let (title, body) = completion_message(finished, transition.next_mode);
        self.alerts.notify(title, body);

        self.state.mode = transition.next_mode;
        self.state.seconds_remaining = transition.duration_secs;
        if transition.auto_start {
            self.start();
        }
    }

    fn append(&mut self, entries: Vec<FocusMinuteLog>) {
        for entry in entries {
            debug!(
                "Logged focus minute {} of session {}{}",
                entry.started_at.to_rfc3339(),
                entry.session_id,
                if entry.is_final_minute_of_session { " (final)" } else { "" }
            );
            self.log.add_focus_session(entry);
        }
    }
}

fn secs(seconds: u64) -> TimeDelta {
    i64::try_from(seconds)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .unwrap_or(TimeDelta::MAX)
}

fn backdate(now: DateTime<Utc>, seconds: u64) -> DateTime<Utc> {
    now.checked_sub_signed(secs(seconds)).unwrap_or(now)
}

fn counted_down(target_minutes: u32, remaining: u64) -> u64 {
    (u64::from(target_minutes) * 60).saturating_sub(remaining)
}

fn completion_message(finished: TimerMode, next: TimerMode) -> (&'static str, &'static str) {
    match (finished, next) {
        (TimerMode::Focus, TimerMode::LongBreak) => {
            ("Long Break Time! 🌴", "Great work! Take a longer break.")
        }
        (TimerMode::Focus, _) => ("Break Time! ☕", "Time for a short break."),
        _ => ("Back to Work! 🎯", "Let's focus on your next session."),
    }
}

/// Brings a snapshot back in line with the running/target-end invariant and with
/// the current settings. An idle timer without a session is reseeded, the same way
/// `update_settings` treats it; anything else is bounded by its mode's length.
fn repair(mut snapshot: TimerState, settings: &TimerSettings, now: DateTime<Utc>) -> TimerState {
    if snapshot.is_running && snapshot.target_end.is_none() {
        warn!("Snapshot was running without a target end; treating it as paused");
        snapshot.is_running = false;
    }
    if !snapshot.is_running && snapshot.target_end.is_some() {
        snapshot.target_end = None;
    }
    if snapshot.mode != TimerMode::Focus && snapshot.session.is_some() {
        warn!("Dropping focus session attached to a {} snapshot", snapshot.mode.as_str());
        snapshot.session = None;
    }

    if !snapshot.is_running && snapshot.session.is_none() {
        snapshot.seconds_remaining = settings.duration_secs(snapshot.mode);
        return snapshot;
    }

    let bound = snapshot
        .session
        .as_ref()
        .map_or(0, |session| u64::from(session.target_minutes) * 60)
        .max(settings.duration_secs(snapshot.mode));
    if snapshot.seconds_remaining > bound {
        warn!(
            "Snapshot had {}s remaining; clamping to {}s",
            snapshot.seconds_remaining, bound
        );
        snapshot.seconds_remaining = bound;
    }
    if let Some(end) = snapshot.target_end {
        let latest = now.checked_add_signed(secs(bound)).unwrap_or(end);
        if end > latest {
            warn!("Snapshot target end {} is too far ahead; clamping", end.to_rfc3339());
            snapshot.target_end = Some(latest);
        }
    }
    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::TimeZone;
    use proptest::prelude::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct RecordingAlerts {
        sounds: Vec<String>,
        notifications: Vec<String>,
    }

    impl Alerts for RecordingAlerts {
        fn play_sound(&mut self, sound_id: &str, _volume: f32) {
            self.sounds.push(sound_id.to_string());
        }

        fn notify(&mut self, title: &str, _body: &str) {
            self.notifications.push(title.to_string());
        }
    }

    type TestTimer = FocusTimer<ManualClock, Vec<FocusMinuteLog>, RecordingAlerts>;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 6, 8, 0, 0).unwrap()
    }

    fn timer_with(settings: TimerSettings) -> (TestTimer, ManualClock) {
        let clock = ManualClock::at(t0());
        let timer = FocusTimer::new(clock.clone(), Vec::new(), RecordingAlerts::default(), settings);
        (timer, clock)
    }

    fn timer() -> (TestTimer, ManualClock) {
        timer_with(TimerSettings::default())
    }

    /// Advances in half-second steps, ticking like the UI loop does.
    fn run_for(timer: &mut TestTimer, clock: &ManualClock, seconds: i64) {
        for _ in 0..seconds * 2 {
            clock.advance(TimeDelta::milliseconds(500));
            timer.tick();
        }
    }

    fn minutes_by_session(log: &[FocusMinuteLog]) -> HashMap<String, u32> {
        let mut totals = HashMap::new();
        for entry in log {
            *totals.entry(entry.session_id.clone()).or_insert(0) += entry.duration_minutes;
        }
        totals
    }

    #[test]
    fn start_sets_target_end_and_opens_session() {
        let (mut timer, _clock) = timer();
        assert!(timer.start());

        let state = timer.state();
        assert!(state.is_running);
        assert_eq!(state.target_end, Some(t0() + TimeDelta::minutes(25)));
        let session = state.session.as_ref().unwrap();
        assert_eq!(session.nominal_start, t0());
        assert_eq!(session.target_minutes, 25);
        assert!(state.check_invariant());
    }

    #[test]
    fn start_while_running_is_ignored() {
        let (mut timer, clock) = timer();
        timer.start();
        clock.advance_secs(10);
        assert!(!timer.start());
        assert_eq!(timer.state().target_end, Some(t0() + TimeDelta::minutes(25)));
    }

    #[test]
    fn pause_while_idle_is_ignored() {
        let (mut timer, _clock) = timer();
        assert!(!timer.pause());
        assert!(timer.state().check_invariant());
    }

    #[test]
    fn ninety_seconds_then_pause_logs_one_minute() {
        let (mut timer, clock) = timer();
        timer.start();
        run_for(&mut timer, &clock, 90);
        timer.pause();

        assert_eq!(timer.log().len(), 1);
        assert!(!timer.log()[0].is_final_minute_of_session);
        assert_eq!(timer.state().seconds_remaining, 25 * 60 - 90);
        assert!(!timer.state().is_running);
        assert!(timer.state().target_end.is_none());
    }

    #[test]
    fn repeated_ticks_within_a_minute_add_nothing() {
        let (mut timer, clock) = timer();
        timer.start();
        clock.advance_secs(61);
        timer.tick();
        timer.tick();
        clock.advance_secs(30);
        timer.tick();

        assert_eq!(timer.log().len(), 1);
    }

    #[test]
    fn pause_resume_keeps_remaining_and_minute_boundaries() {
        let (mut timer, clock) = timer();
        timer.start();
        run_for(&mut timer, &clock, 50);
        timer.pause();
        let remaining = timer.state().seconds_remaining;

        timer.start();
        assert_eq!(timer.state().seconds_remaining, remaining);
        timer.tick();
        assert_eq!(timer.state().seconds_remaining, remaining);

        // Ten more seconds completes the first minute, not earlier.
        run_for(&mut timer, &clock, 9);
        assert!(timer.log().is_empty());
        run_for(&mut timer, &clock, 1);
        assert_eq!(timer.log().len(), 1);
    }

    #[test]
    fn long_pause_does_not_award_minutes() {
        let (mut timer, clock) = timer();
        timer.start();
        run_for(&mut timer, &clock, 30);
        timer.pause();

        clock.advance_secs(600);
        timer.tick();
        timer.start();
        timer.tick();
        assert!(timer.log().is_empty());

        run_for(&mut timer, &clock, 30);
        assert_eq!(timer.log().len(), 1);
        let entry = &timer.log()[0];
        assert_eq!(entry.started_at, t0() + TimeDelta::seconds(600));
    }

    #[test]
    fn completed_focus_has_exactly_one_final_minute() {
        let settings = TimerSettings {
            focus_minutes: 3,
            ..TimerSettings::default()
        };
        let (mut timer, clock) = timer_with(settings);
        timer.start();
        let session_id = timer.state().session.as_ref().unwrap().id.clone();
        run_for(&mut timer, &clock, 3 * 60);

        let log = timer.log();
        assert_eq!(log.len(), 3);
        let finals: Vec<_> = log.iter().filter(|e| e.is_final_minute_of_session).collect();
        assert_eq!(finals.len(), 1);
        assert_eq!(finals[0].session_id, session_id);
        assert!(log.last().unwrap().is_final_minute_of_session);

        let state = timer.state();
        assert_eq!(state.mode, TimerMode::ShortBreak);
        assert_eq!(state.completed_focus_count, 1);
        assert_eq!(state.last_completed_mode, Some(TimerMode::Focus));
        assert!(state.session.is_none());
        assert!(!state.is_running);
        assert_eq!(state.seconds_remaining, 5 * 60);
    }

    #[test]
    fn completion_plays_the_mode_sound_and_notifies() {
        let settings = TimerSettings {
            focus_minutes: 1,
            short_break_minutes: 1,
            ..TimerSettings::default()
        };
        let (mut timer, clock) = timer_with(settings);
        timer.start();
        run_for(&mut timer, &clock, 60);
        timer.start();
        run_for(&mut timer, &clock, 60);

        assert_eq!(timer.alerts.sounds, vec!["bell", "chime"]);
        assert_eq!(timer.alerts.notifications.len(), 2);
        assert_eq!(timer.mode(), TimerMode::Focus);
    }

    #[test]
    fn four_auto_started_sessions_earn_a_long_break() {
        let settings = TimerSettings {
            focus_minutes: 25,
            long_break_every_n_sessions: 4,
            auto_start_breaks: true,
            auto_start_focus: true,
            ..TimerSettings::default()
        };
        let (mut timer, clock) = timer_with(settings.clone());
        timer.start();

        let mut modes = vec![timer.mode()];
        while timer.state().completed_focus_count < 4 {
            let seconds = settings.duration_secs(timer.mode()) as i64;
            clock.advance_secs(seconds);
            timer.tick();
            modes.push(timer.mode());
            assert!(timer.is_running());
        }

        use TimerMode::*;
        assert_eq!(
            modes,
            vec![Focus, ShortBreak, Focus, ShortBreak, Focus, ShortBreak, Focus, LongBreak]
        );
        assert_eq!(timer.state().completed_focus_count, 4);
        assert_eq!(timer.log().len(), 100);
        assert_eq!(
            timer.log().iter().filter(|e| e.is_final_minute_of_session).count(),
            4
        );
    }

    #[test]
    fn breaks_wait_for_the_user_without_auto_start() {
        let settings = TimerSettings {
            focus_minutes: 1,
            ..TimerSettings::default()
        };
        let (mut timer, clock) = timer_with(settings);
        timer.start();
        run_for(&mut timer, &clock, 61);

        assert_eq!(timer.mode(), TimerMode::ShortBreak);
        assert!(!timer.is_running());
        assert_eq!(timer.state().seconds_remaining, 300);
    }

    #[test]
    fn switching_mode_mid_focus_closes_the_session() {
        let (mut timer, clock) = timer();
        timer.start();
        run_for(&mut timer, &clock, 150);
        timer.switch_mode(TimerMode::LongBreak);

        let log = timer.log();
        assert_eq!(log.len(), 3);
        assert!(log[2].is_final_minute_of_session);
        assert_eq!(log[2].ended_at, t0() + TimeDelta::seconds(150));

        let state = timer.state();
        assert_eq!(state.mode, TimerMode::LongBreak);
        assert_eq!(state.seconds_remaining, 15 * 60);
        assert!(!state.is_running);
        assert!(state.session.is_none());
        assert_eq!(state.completed_focus_count, 0);
    }

    #[test]
    fn abandoning_a_paused_session_ignores_pause_time() {
        let (mut timer, clock) = timer();
        timer.start();
        run_for(&mut timer, &clock, 70);
        timer.pause();
        clock.advance_secs(3600);
        timer.reset();

        let log = timer.log();
        assert_eq!(log.len(), 2);
        assert_eq!(log[1].ended_at, t0() + TimeDelta::seconds(70));
        assert_eq!(timer.state().seconds_remaining, 25 * 60);
    }

    #[test]
    fn settings_update_reseeds_an_idle_timer() {
        let (mut timer, _clock) = timer();
        timer.update_settings(TimerSettings {
            focus_minutes: 50,
            ..TimerSettings::default()
        });
        assert_eq!(timer.state().seconds_remaining, 50 * 60);

        timer.start();
        timer.update_settings(TimerSettings::default());
        assert_eq!(timer.state().seconds_remaining, 50 * 60);
    }

    #[test]
    fn restore_recomputes_remaining_from_target_end() {
        let (mut timer, clock) = timer();
        timer.start();
        run_for(&mut timer, &clock, 60);
        let snapshot = timer.state().clone();
        let log = timer.log().clone();

        // Page closed for four minutes.
        clock.advance_secs(240);
        let restored = FocusTimer::restore(
            clock.clone(),
            log,
            RecordingAlerts::default(),
            TimerSettings::default(),
            snapshot,
        );

        assert!(restored.is_running());
        assert_eq!(restored.state().seconds_remaining, 25 * 60 - 300);
        assert_eq!(restored.log().len(), 5);
    }

    #[test]
    fn restore_completes_an_overdue_session_immediately() {
        let (mut timer, clock) = timer();
        timer.start();
        let snapshot = timer.state().clone();

        clock.advance_secs(2 * 3600);
        let restored = FocusTimer::restore(
            clock.clone(),
            Vec::new(),
            RecordingAlerts::default(),
            TimerSettings::default(),
            snapshot,
        );

        let state = restored.state();
        assert_eq!(state.mode, TimerMode::ShortBreak);
        assert_eq!(state.completed_focus_count, 1);
        assert!(!state.is_running);
        assert_eq!(restored.log().len(), 25);
        assert!(restored.log().last().unwrap().is_final_minute_of_session);
        assert_eq!(restored.alerts.sounds, vec!["bell"]);
    }

    #[test]
    fn restore_repairs_a_running_snapshot_without_target_end() {
        let clock = ManualClock::at(t0());
        let mut snapshot = TimerState::initial(&TimerSettings::default());
        snapshot.is_running = true;
        snapshot.seconds_remaining = 600;

        let restored: TestTimer = FocusTimer::restore(
            clock,
            Vec::new(),
            RecordingAlerts::default(),
            TimerSettings::default(),
            snapshot,
        );

        assert!(!restored.is_running());
        assert!(restored.state().check_invariant());
        assert_eq!(restored.state().seconds_remaining, 25 * 60);
    }

    #[test]
    fn restore_reseeds_an_idle_snapshot_with_new_settings() {
        let clock = ManualClock::at(t0());
        let snapshot = TimerState::initial(&TimerSettings::default());
        let settings = TimerSettings {
            focus_minutes: 50,
            ..TimerSettings::default()
        };

        let mut restored: TestTimer = FocusTimer::restore(
            clock.clone(),
            Vec::new(),
            RecordingAlerts::default(),
            settings,
            snapshot,
        );
        assert_eq!(restored.state().seconds_remaining, 50 * 60);

        restored.start();
        let session = restored.state().session.as_ref().unwrap();
        assert_eq!(session.target_minutes, 50);
        assert_eq!(session.committed_minutes, 0);

        clock.advance_secs(50 * 60);
        restored.tick();
        assert_eq!(restored.log().len(), 50);
    }

    #[test]
    fn restore_clamps_an_out_of_range_remaining_time() {
        let clock = ManualClock::at(t0());
        let mut snapshot = TimerState::initial(&TimerSettings::default());
        snapshot.mode = TimerMode::ShortBreak;
        snapshot.seconds_remaining = u64::MAX;
        snapshot.is_running = true;
        snapshot.target_end = Some(t0() + TimeDelta::days(365));

        let mut restored: TestTimer = FocusTimer::restore(
            clock.clone(),
            Vec::new(),
            RecordingAlerts::default(),
            TimerSettings::default(),
            snapshot,
        );
        assert_eq!(restored.state().target_end, Some(t0() + TimeDelta::minutes(5)));
        assert_eq!(restored.state().seconds_remaining, 5 * 60);

        restored.pause();
        assert!(restored.start());
        assert_eq!(restored.state().target_end, Some(t0() + TimeDelta::minutes(5)));
    }

    #[test]
    fn restore_clamps_a_paused_session_to_its_target() {
        let clock = ManualClock::at(t0());
        let (mut timer, _) = timer();
        timer.start();
        timer.pause();
        let mut snapshot = timer.state().clone();
        snapshot.seconds_remaining = u64::MAX;

        let mut restored: TestTimer = FocusTimer::restore(
            clock,
            Vec::new(),
            RecordingAlerts::default(),
            TimerSettings::default(),
            snapshot,
        );
        assert_eq!(restored.state().seconds_remaining, 25 * 60);
        assert!(restored.start());
        assert_eq!(restored.state().target_end, Some(t0() + TimeDelta::minutes(25)));
    }

    #[test]
    fn starting_a_partly_counted_focus_does_not_award_past_minutes() {
        let (mut timer, clock) = timer();
        timer.state.seconds_remaining = 25 * 60 - 150;
        timer.start();
        timer.tick();
        assert!(timer.log().is_empty());

        run_for(&mut timer, &clock, 30);
        assert_eq!(timer.log().len(), 1);
    }

    #[derive(Debug, Clone)]
    enum Action {
        Start,
        Pause,
        Wait(i64),
    }

    fn action() -> impl Strategy<Value = Action> {
        prop_oneof![
            Just(Action::Start),
            Just(Action::Pause),
            (1i64..400).prop_map(Action::Wait),
        ]
    }

    proptest! {
        #[test]
        fn committed_minutes_never_exceed_target(actions in prop::collection::vec(action(), 1..60)) {
            let settings = TimerSettings {
                focus_minutes: 5,
                ..TimerSettings::default()
            };
            let (mut timer, clock) = timer_with(settings);

            for action in actions {
                match action {
                    Action::Start => { timer.start(); }
                    Action::Pause => { timer.pause(); }
                    Action::Wait(seconds) => {
                        clock.advance_secs(seconds);
                        timer.tick();
                    }
                }
                prop_assert!(timer.state().check_invariant());
            }

            for (_, minutes) in minutes_by_session(timer.log()) {
                prop_assert!(minutes <= 5);
            }
            let finals = timer.log().iter().filter(|e| e.is_final_minute_of_session).count();
            prop_assert_eq!(finals as u32, timer.state().completed_focus_count);
        }

        #[test]
        fn immediate_resume_is_invisible(elapsed in 1i64..(25 * 60 - 1)) {
            let (mut timer, clock) = timer();
            timer.start();
            clock.advance_secs(elapsed);
            timer.tick();
            let logged = timer.log().len();

            timer.pause();
            let remaining = timer.state().seconds_remaining;
            timer.start();
            timer.tick();

            prop_assert_eq!(timer.state().seconds_remaining, remaining);
            prop_assert_eq!(timer.log().len(), logged);
            prop_assert_eq!(
                timer.state().session.as_ref().unwrap().nominal_start,
                t0()
            );
        }
    }
}
