use crate::calendar::{date_key, days_ago, weekday_label};
use crate::ledger::CompletionLedger;
use crate::models::{ChartPoint, DayMark};
use chrono::NaiveDate;

pub const CHART_DAYS: u32 = 7;

/// Seven buckets ending today, oldest first, counting habits done each day.
pub fn weekly_chart_at<'a, I>(today: NaiveDate, ledgers: I) -> Vec<ChartPoint>
where
    I: IntoIterator<Item = &'a CompletionLedger>,
{
    activity_window(today, CHART_DAYS, ledgers)
}

pub fn activity_window<'a, I>(today: NaiveDate, days: u32, ledgers: I) -> Vec<ChartPoint>
where
    I: IntoIterator<Item = &'a CompletionLedger>,
{
    let mut points: Vec<ChartPoint> = (0..days)
        .rev()
        .map(|offset| {
            let date = days_ago(today, offset);
            ChartPoint {
                date: date_key(date),
                label: weekday_label(date),
                count: 0,
            }
        })
        .collect();

    for ledger in ledgers {
        for point in points.iter_mut() {
            if ledger.has(&point.date) {
                point.count = point.count.saturating_add(1);
            }
        }
    }

    points
}

/// Done/missed strip for a single habit over the last seven days.
pub fn habit_week(today: NaiveDate, ledger: &CompletionLedger) -> Vec<DayMark> {
    (0..CHART_DAYS)
        .rev()
        .map(|offset| {
            let date = days_ago(today, offset);
            let key = date_key(date);
            DayMark {
                completed: ledger.has(&key),
                label: weekday_label(date),
                date: key,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()
    }

    fn key(offset: u32) -> String {
        date_key(days_ago(today(), offset))
    }

    #[test]
    fn window_counts_habits_per_day_oldest_first() {
        let h1: CompletionLedger = [key(2), key(0)].into_iter().collect();
        let h2: CompletionLedger = [key(0)].into_iter().collect();

        let points = activity_window(today(), 3, [&h1, &h2]);
        let counts: Vec<u32> = points.iter().map(|p| p.count).collect();
        assert_eq!(counts, vec![1, 0, 2]);
        assert_eq!(points[0].date, "2026-01-03");
        assert_eq!(points[2].date, "2026-01-05");
    }

    #[test]
    fn weekly_chart_has_seven_labelled_buckets() {
        let points = weekly_chart_at(today(), std::iter::empty());
        assert_eq!(points.len(), 7);
        assert_eq!(points[0].label, "Tue");
        assert_eq!(points[6].label, "Mon");
        assert!(points.iter().all(|p| p.count == 0));
    }

    #[test]
    fn entries_outside_window_are_ignored() {
        let old: CompletionLedger = [key(7), key(30)].into_iter().collect();
        let points = weekly_chart_at(today(), [&old]);
        assert!(points.iter().all(|p| p.count == 0));
    }

    #[test]
    fn habit_week_marks_completed_days() {
        let ledger: CompletionLedger = [key(0), key(3)].into_iter().collect();
        let week = habit_week(today(), &ledger);
        let marks: Vec<bool> = week.iter().map(|d| d.completed).collect();
        assert_eq!(marks, vec![false, false, false, true, false, false, true]);
    }
}
