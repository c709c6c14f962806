//! Experience points, levels and badges.
//!
//! Level is never stored on its own: [`Profile::level`] derives it from xp, so
//! a stale `level` in a stored document cannot leak into any read.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const XP_PER_LEVEL: u64 = 100;
pub const STREAK_BADGE_DAYS: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BadgeId {
    #[serde(rename = "streak_7")]
    SevenDayStreak,
    #[serde(rename = "level_2")]
    LevelTwo,
    #[serde(rename = "first_habit")]
    FirstHabit,
}

impl BadgeId {
    pub const ALL: [BadgeId; 3] = [BadgeId::SevenDayStreak, BadgeId::LevelTwo, BadgeId::FirstHabit];

    pub fn name(self) -> &'static str {
        match self {
            BadgeId::SevenDayStreak => "7 Day Streak",
            BadgeId::LevelTwo => "Level 2",
            BadgeId::FirstHabit => "First Habit",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            BadgeId::SevenDayStreak => "Complete a habit seven days in a row",
            BadgeId::LevelTwo => "Reach level 2",
            BadgeId::FirstHabit => "Create your first habit",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            BadgeId::SevenDayStreak => "🔥",
            BadgeId::LevelTwo => "🆙",
            BadgeId::FirstHabit => "🌱",
        }
    }

    fn is_satisfied(self, profile: &Profile, facts: &BadgeFacts) -> bool {
        match self {
            BadgeId::SevenDayStreak => facts.longest_current_streak >= STREAK_BADGE_DAYS,
            BadgeId::LevelTwo => profile.level() >= 2,
            BadgeId::FirstHabit => facts.total_habits >= 1,
        }
    }
}

/// Observations about a user's habits that badge rules are evaluated against.
#[derive(Debug, Clone, Copy, Default)]
pub struct BadgeFacts {
    pub longest_current_streak: u32,
    pub total_habits: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ProfileRecord", into = "ProfileRecord")]
pub struct Profile {
    pub user_id: String,
    pub xp: u64,
    pub earned_badges: BTreeSet<BadgeId>,
}

/// Stored shape. `level` is written for readers of the document and ignored
/// on load.
#[derive(Serialize, Deserialize)]
struct ProfileRecord {
    user_id: String,
    xp: u64,
    #[serde(default)]
    level: Option<u64>,
    #[serde(default)]
    earned_badges: BTreeSet<BadgeId>,
}

impl From<ProfileRecord> for Profile {
    fn from(record: ProfileRecord) -> Self {
        Self {
            user_id: record.user_id,
            xp: record.xp,
            earned_badges: record.earned_badges,
        }
    }
}

impl From<Profile> for ProfileRecord {
    fn from(profile: Profile) -> Self {
        Self {
            level: Some(profile.level()),
            user_id: profile.user_id,
            xp: profile.xp,
            earned_badges: profile.earned_badges,
        }
    }
}

pub fn level_for_xp(xp: u64) -> u64 {
    xp / XP_PER_LEVEL + 1
}

impl Profile {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            xp: 0,
            earned_badges: BTreeSet::new(),
        }
    }

    /// Adds `amount` (possibly negative) to xp, clamping at zero, and returns
    /// the resulting level.
    pub fn apply_delta(&mut self, amount: i64) -> u64 {
        self.xp = if amount >= 0 {
            self.xp.saturating_add(amount.unsigned_abs())
        } else {
            self.xp.saturating_sub(amount.unsigned_abs())
        };
        self.level()
    }

    pub fn level(&self) -> u64 {
        level_for_xp(self.xp)
    }

    /// Back to level 1. Earned badges are kept.
    pub fn reset(&mut self) {
        self.xp = 0;
    }

    pub fn xp_into_level(&self) -> u64 {
        self.xp % XP_PER_LEVEL
    }

    pub fn xp_to_next_level(&self) -> u64 {
        XP_PER_LEVEL - self.xp_into_level()
    }

    pub fn has_badge(&self, badge: BadgeId) -> bool {
        self.earned_badges.contains(&badge)
    }

    /// Awards every badge whose rule now holds and returns the ones that are new.
    pub fn evaluate_badges(&mut self, facts: &BadgeFacts) -> Vec<BadgeId> {
        let newly_earned: Vec<BadgeId> = BadgeId::ALL
            .into_iter()
            .filter(|badge| !self.has_badge(*badge) && badge.is_satisfied(self, facts))
            .collect();
        self.earned_badges.extend(newly_earned.iter().copied());
        newly_earned
    }
}
