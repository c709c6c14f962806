use crate::calendar::parse_day_key;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const XP_PER_COMPLETION: i64 = 10;

/// Set of completed day-keys for one habit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletionLedger {
    days: BTreeSet<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleStatus {
    Added,
    Removed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Toggle {
    pub status: ToggleStatus,
    pub changed: bool,
}

impl Toggle {
    /// XP owed for this toggle; zero when the ledger did not change.
    pub fn xp_delta(&self) -> i64 {
        match (self.status, self.changed) {
            (_, false) => 0,
            (ToggleStatus::Added, true) => XP_PER_COMPLETION,
            (ToggleStatus::Removed, true) => -XP_PER_COMPLETION,
        }
    }
}

impl CompletionLedger {
    pub fn has(&self, day_key: &str) -> bool {
        self.days.contains(day_key)
    }

    pub fn add(&mut self, day_key: &str) -> bool {
        if self.days.contains(day_key) {
            return false;
        }
        self.days.insert(day_key.to_owned())
    }

    pub fn remove(&mut self, day_key: &str) -> bool {
        self.days.remove(day_key)
    }

    /// Applies a client-reported toggle against `today_key`.
    ///
    /// `currently_completed == true` removes the entry, otherwise it is added.
    pub fn toggle(&mut self, today_key: &str, currently_completed: bool) -> Toggle {
        if currently_completed {
            Toggle {
                status: ToggleStatus::Removed,
                changed: self.remove(today_key),
            }
        } else {
            Toggle {
                status: ToggleStatus::Added,
                changed: self.add(today_key),
            }
        }
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Day-keys in ascending calendar order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.days.iter().map(String::as_str)
    }

    /// Well-formed entries as dates, ascending. Malformed keys are skipped.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.iter().filter_map(|key| parse_day_key(key))
    }
}

impl<S: Into<String>> FromIterator<S> for CompletionLedger {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            days: iter.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TODAY: &str = "2026-01-05";

    #[test]
    fn add_is_idempotent() {
        let mut ledger = CompletionLedger::default();
        assert!(ledger.add(TODAY));
        assert!(!ledger.add(TODAY));
        assert_eq!(ledger.len(), 1);
        assert!(ledger.has(TODAY));
    }

    #[test]
    fn remove_reports_whether_anything_was_removed() {
        let mut ledger: CompletionLedger = [TODAY].into_iter().collect();
        assert!(ledger.remove(TODAY));
        assert!(!ledger.remove(TODAY));
        assert!(ledger.is_empty());
    }

    #[test]
    fn toggle_branches_on_reported_state() {
        let mut ledger = CompletionLedger::default();

        let added = ledger.toggle(TODAY, false);
        assert_eq!(added.status, ToggleStatus::Added);
        assert!(added.changed);
        assert_eq!(added.xp_delta(), 10);

        let again = ledger.toggle(TODAY, false);
        assert!(!again.changed);
        assert_eq!(again.xp_delta(), 0);

        let removed = ledger.toggle(TODAY, true);
        assert_eq!(removed.status, ToggleStatus::Removed);
        assert_eq!(removed.xp_delta(), -10);
        assert!(ledger.is_empty());

        let stale = ledger.toggle(TODAY, true);
        assert!(!stale.changed);
        assert_eq!(stale.xp_delta(), 0);
    }

    #[test]
    fn serializes_as_sorted_array() {
        let ledger: CompletionLedger = ["2026-01-05", "2026-01-03"].into_iter().collect();
        let json = serde_json::to_string(&ledger).unwrap();
        assert_eq!(json, r#"["2026-01-03","2026-01-05"]"#);
    }

    #[test]
    fn dates_skip_malformed_keys() {
        let ledger: CompletionLedger = ["2026-01-05", "yesterday"].into_iter().collect();
        assert_eq!(ledger.dates().count(), 1);
        assert_eq!(ledger.keys().count(), 2);
    }
}
