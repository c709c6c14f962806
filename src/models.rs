use crate::gamification::{BadgeId, Profile};
use crate::ledger::{CompletionLedger, ToggleStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_ICON: &str = "📝";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub icon: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_dates: CompletionLedger,
}

impl Habit {
    pub fn new(user_id: impl Into<String>, name: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            name: name.into(),
            icon: icon.into(),
            created_at: Utc::now(),
            completed_dates: CompletionLedger::default(),
        }
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}

/// The persisted document.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppData {
    #[serde(default)]
    pub habits: BTreeMap<String, Habit>,
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

#[derive(Debug, Deserialize)]
pub struct CreateHabitRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleRequest {
    #[serde(alias = "currentlyCompleted")]
    pub is_completed: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleResponse {
    pub status: ToggleStatus,
    pub new_level: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayMark {
    pub date: String,
    pub label: String,
    pub completed: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitView {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub created_at: DateTime<Utc>,
    pub streak: u32,
    pub best_streak: u32,
    pub today_completed: bool,
    pub completed_dates: Vec<String>,
    pub last_7_days: Vec<DayMark>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub date: String,
    pub label: String,
    pub count: u32,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub xp: u64,
    pub level: u64,
    pub xp_into_level: u64,
    pub xp_to_next_level: u64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_habits: usize,
    pub active_streaks_today: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BadgeView {
    pub id: BadgeId,
    pub name: String,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub profile: ProfileView,
    pub stats: DashboardStats,
    pub chart_data: Vec<ChartPoint>,
    pub badges: Vec<BadgeView>,
}
