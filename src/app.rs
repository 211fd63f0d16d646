use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, TimeZone};
use log::{info, warn};
use std::{fs, path::Path};

use crate::{
    alerts::Alerts,
    analytics::{self, FocusSummary},
    clock::Clock,
    settings::{SETTINGS_KEY, TimerSettings},
    state::{TIMER_STATE_KEY, TimerMode, TimerState},
    store::{FocusLog, KeyValueStore, load_json, save_json, try_load_json},
    timer::FocusTimer,
};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum View {
    Timer,
    Stats,
    Help,
}

/// Owns the timer, the minute log and the store they persist to. Every mutating
/// call saves whatever changed before returning.
pub struct App<C: Clock> {
    timer: FocusTimer<C, FocusLog, Box<dyn Alerts>>,
    store: Box<dyn KeyValueStore>,
    last_saved: Option<TimerState>,
    summary: FocusSummary,
    summarized: (usize, NaiveDate),
    pub view: View,
}

impl<C: Clock> App<C> {
    /// Loads settings, log and the last timer snapshot from `store`. `configure`
    /// applies run-time overrides on top of the persisted settings.
    pub fn load(
        clock: C,
        store: Box<dyn KeyValueStore>,
        alerts: Box<dyn Alerts>,
        configure: impl FnOnce(&mut TimerSettings),
    ) -> Self {
        let mut settings: TimerSettings = load_json(store.as_ref(), SETTINGS_KEY);
        configure(&mut settings);
        let settings = settings.sanitized();

        let log = FocusLog::load(store.as_ref());
        let timer = match try_load_json::<TimerState>(store.as_ref(), TIMER_STATE_KEY) {
            Some(snapshot) => {
                info!("Restoring {} timer from snapshot", snapshot.mode.as_str());
                FocusTimer::restore(clock, log, alerts, settings, snapshot)
            }
            None => FocusTimer::new(clock, log, alerts, settings),
        };

        let today = Local::now().date_naive();
        let summary = analytics::summarize(timer.log().entries(), &Local, today);
        let summarized = (timer.log().entries().len(), today);
        let mut app = Self {
            timer,
            store,
            last_saved: None,
            summary,
            summarized,
            view: View::Timer,
        };
        app.save_settings();
        app.persist();
        app
    }

    pub fn timer(&self) -> &FocusTimer<C, FocusLog, Box<dyn Alerts>> {
        &self.timer
    }

    pub fn tick(&mut self) {
        self.timer.tick();
        self.persist();
    }

    pub fn toggle(&mut self) {
        self.timer.toggle();
        self.persist();
    }

    pub fn reset(&mut self) {
        self.timer.reset();
        self.persist();
    }

    pub fn switch_mode(&mut self, mode: TimerMode) {
        self.timer.switch_mode(mode);
        self.persist();
    }

    pub fn update_settings(&mut self, settings: TimerSettings) {
        self.timer.update_settings(settings);
        self.save_settings();
        self.persist();
    }

    pub fn summary<Tz: TimeZone>(&self, tz: &Tz, today: NaiveDate) -> FocusSummary {
        analytics::summarize(self.timer.log().entries(), tz, today)
    }

    /// Summary in local time as of the last `refresh_summary`.
    pub fn local_summary(&self) -> &FocusSummary {
        &self.summary
    }

    /// Recomputes the local summary when the log grew or the day rolled over.
    pub fn refresh_summary(&mut self) {
        let key = (self.timer.log().entries().len(), Local::now().date_naive());
        if key != self.summarized {
            self.summary = self.summary(&Local, key.1);
            self.summarized = key;
        }
    }

    pub fn export_csv(&self, path: &Path) -> Result<()> {
        let csv = analytics::export_csv(self.timer.log().entries(), &Local);
        fs::write(path, csv).with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Saves the timer snapshot when it changed and flushes new log entries.
    pub fn persist(&mut self) {
        let state = self.timer.state();
        if self.last_saved.as_ref() != Some(state) {
            match save_json(self.store.as_mut(), TIMER_STATE_KEY, state) {
                Ok(()) => self.last_saved = Some(state.clone()),
                Err(err) => warn!("Failed to save timer state: {err}"),
            }
        }

        if let Err(err) = self.timer.log_mut().save(self.store.as_mut()) {
            warn!("Failed to save focus log: {err}");
        }
        self.refresh_summary();
    }

    fn save_settings(&mut self) {
        if let Err(err) = save_json(self.store.as_mut(), SETTINGS_KEY, self.timer.settings()) {
            warn!("Failed to save settings: {err}");
        }
    }
}
