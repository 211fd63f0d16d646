//! Turns elapsed focus time into append-only one-minute log entries.
//!
//! Every function here is pure: it looks at the session accumulator and returns the
//! entries that should be appended next. The caller advances
//! `FocusSession::committed_minutes` by the number of entries it appended, which is
//! what keeps a minute index from ever being emitted twice.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::FocusSession;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusMinuteLog {
    pub id: String,
    pub session_id: String,
    pub duration_minutes: u32,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub is_final_minute_of_session: bool,
    pub session_target_minutes: u32,
}

fn entry(session: &FocusSession, index: u32, is_final: bool) -> FocusMinuteLog {
    let started_at = session.nominal_start + TimeDelta::minutes(i64::from(index));
    FocusMinuteLog {
        id: Uuid::new_v4().to_string(),
        session_id: session.id.clone(),
        duration_minutes: 1,
        started_at,
        ended_at: started_at + TimeDelta::minutes(1),
        is_final_minute_of_session: is_final,
        session_target_minutes: session.target_minutes,
    }
}

/// Non-final entries for whole minutes not yet committed. The session's last minute
/// is never returned here; it belongs to completion so that exactly one final entry
/// exists per finished session.
pub fn elapsed_entries(session: &FocusSession, elapsed_whole_minutes: u32) -> Vec<FocusMinuteLog> {
    let ceiling = elapsed_whole_minutes.min(session.target_minutes.saturating_sub(1));
    (session.committed_minutes..ceiling)
        .map(|index| entry(session, index, false))
        .collect()
}

/// Backfills every remaining minute up to the target and flags the last one final.
pub fn completion_entries(session: &FocusSession) -> Vec<FocusMinuteLog> {
    let target = session.target_minutes;
    (session.committed_minutes..target)
        .map(|index| entry(session, index, index + 1 == target))
        .collect()
}

/// Entries for a session cut short at `now`: whole minutes first, then one closing
/// final entry when a partial minute of focus is left over.
pub fn abandonment_entries(session: &FocusSession, now: DateTime<Utc>) -> Vec<FocusMinuteLog> {
    let mut entries = elapsed_entries(session, session.elapsed_whole_minutes(now));
    let committed = session.committed_minutes + entries.len() as u32;

    let partial = FocusSession {
        committed_minutes: committed,
        ..session.clone()
    };
    if committed < session.target_minutes && partial.has_uncommitted_time(now) {
        let mut last = entry(session, committed, true);
        last.ended_at = now.min(last.ended_at);
        entries.push(last);
    }

    entries
}
