//! Focus timer core: a Pomodoro state machine that turns a running countdown into
//! one-minute focus log entries, plus the persistence, scheduling and analytics
//! pieces the terminal front end is built from.

pub mod alerts;
pub mod analytics;
pub mod app;
pub mod clock;
pub mod minute_log;
pub mod policy;
pub mod scheduler;
pub mod settings;
pub mod state;
pub mod store;
pub mod timer;

pub use alerts::{Alerts, DesktopAlerts, SilentAlerts};
pub use clock::{Clock, ManualClock, SystemClock};
pub use minute_log::FocusMinuteLog;
pub use policy::{Transition, next_transition};
pub use scheduler::{LoopScheduler, Scheduler, TaskHandle};
pub use settings::TimerSettings;
pub use state::{FocusSession, TimerMode, TimerState};
pub use store::{FileStore, FocusLog, FocusLogSink, KeyValueStore, MemoryStore, StoreError};
pub use timer::FocusTimer;
