use chrono::{Days, NaiveDate, TimeZone};
use std::collections::{BTreeMap, HashSet};

use crate::minute_log::FocusMinuteLog;

const DAILY_FMT: &str = "%Y-%m-%d";

fn local_day<Tz: TimeZone>(entry: &FocusMinuteLog, tz: &Tz) -> NaiveDate {
    entry.started_at.with_timezone(tz).date_naive()
}

pub fn total_minutes(logs: &[FocusMinuteLog]) -> u32 {
    logs.iter().map(|entry| entry.duration_minutes).sum()
}

/// Finished sessions, counted by their closing entry.
pub fn completed_sessions(logs: &[FocusMinuteLog]) -> usize {
    logs.iter()
        .filter(|entry| entry.is_final_minute_of_session)
        .count()
}

/// Focus minutes per local day for every day in `from..=to`, zero-filled.
pub fn minutes_by_day<Tz: TimeZone>(
    logs: &[FocusMinuteLog],
    tz: &Tz,
    from: NaiveDate,
    to: NaiveDate,
) -> BTreeMap<NaiveDate, u32> {
    let mut days: BTreeMap<NaiveDate, u32> = from
        .iter_days()
        .take_while(|day| *day <= to)
        .map(|day| (day, 0))
        .collect();

    for entry in logs {
        if let Some(minutes) = days.get_mut(&local_day(entry, tz)) {
            *minutes += entry.duration_minutes;
        }
    }
    days
}

/// Consecutive days with any focus, ending today. A day without focus yet does not
/// break the streak until it is over, so the count may end yesterday.
pub fn current_streak<Tz: TimeZone>(logs: &[FocusMinuteLog], tz: &Tz, today: NaiveDate) -> u32 {
    let active: HashSet<NaiveDate> = logs.iter().map(|entry| local_day(entry, tz)).collect();

    let mut day = if active.contains(&today) {
        today
    } else {
        match today.checked_sub_days(Days::new(1)) {
            Some(yesterday) => yesterday,
            None => return 0,
        }
    };

    let mut streak = 0;
    while active.contains(&day) {
        streak += 1;
        day = match day.checked_sub_days(Days::new(1)) {
            Some(previous) => previous,
            None => break,
        };
    }
    streak
}

#[derive(Debug, Clone, PartialEq)]
pub struct FocusSummary {
    pub today_minutes: u32,
    pub total_minutes: u32,
    pub completed_sessions: usize,
    pub streak_days: u32,
    /// Oldest first, ending today.
    pub last_seven_days: Vec<(NaiveDate, u32)>,
}

pub fn summarize<Tz: TimeZone>(logs: &[FocusMinuteLog], tz: &Tz, today: NaiveDate) -> FocusSummary {
    let week_start = today.checked_sub_days(Days::new(6)).unwrap_or(today);
    let last_seven_days: Vec<(NaiveDate, u32)> =
        minutes_by_day(logs, tz, week_start, today).into_iter().collect();

    FocusSummary {
        today_minutes: last_seven_days.last().map(|(_, m)| *m).unwrap_or(0),
        total_minutes: total_minutes(logs),
        completed_sessions: completed_sessions(logs),
        streak_days: current_streak(logs, tz, today),
        last_seven_days,
    }
}

/// CSV of daily totals followed by the raw minute log, newest first.
pub fn export_csv<Tz: TimeZone>(logs: &[FocusMinuteLog], tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let mut csv = String::from("Date,Focus Minutes,Sessions Completed\n");

    let mut daily: BTreeMap<NaiveDate, (u32, u32)> = BTreeMap::new();
    for entry in logs {
        let day = daily.entry(local_day(entry, tz)).or_default();
        day.0 += entry.duration_minutes;
        if entry.is_final_minute_of_session {
            day.1 += 1;
        }
    }
    for (date, (minutes, sessions)) in daily.iter().rev() {
        csv.push_str(&format!("{},{},{}\n", date.format(DAILY_FMT), minutes, sessions));
    }

    csv.push_str("\nMinute Log\nStarted,Ended,Session,Target (min),Final\n");
    for entry in logs.iter().rev() {
        csv.push_str(&format!(
            "{},{},{},{},{}\n",
            entry.started_at.with_timezone(tz).to_rfc3339(),
            entry.ended_at.with_timezone(tz).to_rfc3339(),
            entry.session_id,
            entry.session_target_minutes,
            if entry.is_final_minute_of_session { "Yes" } else { "No" }
        ));
    }
    csv
}
