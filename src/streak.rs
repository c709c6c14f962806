//! Streaks derived from a completion ledger.
//!
//! Both numbers are recomputed from the full ledger on every call; entries
//! can disappear from any day, so there is no stored high-water mark.

use crate::calendar::{date_key, days_ago};
use crate::ledger::CompletionLedger;
use chrono::{Duration, NaiveDate};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StreakSnapshot {
    pub current: u32,
    pub best: u32,
}

pub fn streak_snapshot(ledger: &CompletionLedger, today: NaiveDate) -> StreakSnapshot {
    StreakSnapshot {
        current: current_streak(ledger, today),
        best: best_streak(ledger),
    }
}

/// Consecutive days ending today, or ending yesterday if today is not done yet.
pub fn current_streak(ledger: &CompletionLedger, today: NaiveDate) -> u32 {
    let anchor = if ledger.has(&date_key(today)) {
        today
    } else {
        let yesterday = days_ago(today, 1);
        if !ledger.has(&date_key(yesterday)) {
            return 0;
        }
        yesterday
    };

    let mut streak = 0;
    let mut cursor = anchor;
    while ledger.has(&date_key(cursor)) {
        streak += 1;
        cursor = days_ago(cursor, 1);
    }
    streak
}

/// Length of the longest run of consecutive days anywhere in the ledger.
pub fn best_streak(ledger: &CompletionLedger) -> u32 {
    let mut best = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;

    for date in ledger.dates() {
        run = match previous {
            Some(prev) if date - prev == Duration::days(1) => run + 1,
            _ => 1,
        };
        best = best.max(run);
        previous = Some(date);
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()
    }

    fn ledger_of(offsets: &[u32]) -> CompletionLedger {
        offsets
            .iter()
            .map(|n| date_key(days_ago(today(), *n)))
            .collect()
    }

    #[test]
    fn empty_ledger_has_no_streak() {
        let snapshot = streak_snapshot(&CompletionLedger::default(), today());
        assert_eq!(snapshot, StreakSnapshot { current: 0, best: 0 });
    }

    #[test]
    fn single_entry_today() {
        let snapshot = streak_snapshot(&ledger_of(&[0]), today());
        assert_eq!(snapshot, StreakSnapshot { current: 1, best: 1 });
    }

    #[test]
    fn yesterday_keeps_streak_alive() {
        assert_eq!(current_streak(&ledger_of(&[1]), today()), 1);
        assert_eq!(current_streak(&ledger_of(&[1, 2, 3]), today()), 3);
    }

    #[test]
    fn two_day_gap_breaks_streak() {
        assert_eq!(current_streak(&ledger_of(&[2, 3]), today()), 0);
    }

    #[test]
    fn gap_yesterday_stops_the_walk() {
        assert_eq!(current_streak(&ledger_of(&[0, 2]), today()), 1);
    }

    #[test]
    fn best_streak_finds_longest_historic_run() {
        let ledger = ledger_of(&[0, 1, 5, 6, 7, 8, 20]);
        let snapshot = streak_snapshot(&ledger, today());
        assert_eq!(snapshot.current, 2);
        assert_eq!(snapshot.best, 4);
    }

    #[test]
    fn best_streak_spans_month_boundary() {
        let ledger: CompletionLedger = ["2026-01-30", "2026-01-31", "2026-02-01"]
            .into_iter()
            .collect();
        assert_eq!(best_streak(&ledger), 3);
    }

    #[test]
    fn best_is_never_below_current() {
        let patterns: [&[u32]; 6] = [&[], &[0], &[1], &[0, 1, 2], &[1, 3, 4, 5], &[0, 2, 4, 6]];
        for offsets in patterns {
            let snapshot = streak_snapshot(&ledger_of(offsets), today());
            assert!(
                snapshot.best >= snapshot.current,
                "{offsets:?} -> {snapshot:?}"
            );
        }
    }
}
