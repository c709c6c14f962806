//! Canonical calendar days.
//!
//! Every completion is keyed by a `YYYY-MM-DD` string taken at the UTC
//! midnight boundary. Nothing else in the crate formats or parses dates.

use chrono::{DateTime, Duration, NaiveDate, Utc};

const DAY_KEY_FORMAT: &str = "%Y-%m-%d";

/// Source of "today" for the service layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Clock {
    #[default]
    System,
    Fixed(NaiveDate),
}

impl Clock {
    pub fn today(&self) -> NaiveDate {
        match self {
            Clock::System => today(),
            Clock::Fixed(date) => *date,
        }
    }
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub fn days_ago(today: NaiveDate, n: u32) -> NaiveDate {
    today - Duration::days(i64::from(n))
}

pub fn day_key(instant: DateTime<Utc>) -> String {
    date_key(instant.date_naive())
}

pub fn date_key(date: NaiveDate) -> String {
    date.format(DAY_KEY_FORMAT).to_string()
}

/// Parses a stored day-key, rejecting anything that would not format back
/// to the same string (`2026-1-5`, trailing text, ...).
pub fn parse_day_key(key: &str) -> Option<NaiveDate> {
    if key.len() != 10 {
        return None;
    }
    let date = NaiveDate::parse_from_str(key, DAY_KEY_FORMAT).ok()?;
    (date_key(date) == key).then_some(date)
}

pub fn weekday_label(date: NaiveDate) -> String {
    date.format("%a").to_string()
}
