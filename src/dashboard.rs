use crate::calendar::date_key;
use crate::gamification::{BadgeId, Profile};
use crate::models::{BadgeView, DashboardResponse, DashboardStats, Habit, ProfileView};
use crate::stats::weekly_chart_at;
use chrono::NaiveDate;

pub fn compose_dashboard(profile: &Profile, habits: &[Habit], today: NaiveDate) -> DashboardResponse {
    let today_key = date_key(today);
    let active_streaks_today = habits
        .iter()
        .filter(|habit| habit.completed_dates.has(&today_key))
        .count();

    DashboardResponse {
        profile: profile_view(profile),
        stats: DashboardStats {
            total_habits: habits.len(),
            active_streaks_today,
        },
        chart_data: weekly_chart_at(today, habits.iter().map(|habit| &habit.completed_dates)),
        badges: badge_views(profile),
    }
}

pub fn profile_view(profile: &Profile) -> ProfileView {
    ProfileView {
        xp: profile.xp,
        level: profile.level(),
        xp_into_level: profile.xp_into_level(),
        xp_to_next_level: profile.xp_to_next_level(),
    }
}

fn badge_views(profile: &Profile) -> Vec<BadgeView> {
    BadgeId::ALL
        .into_iter()
        .filter(|badge| profile.has_badge(*badge))
        .map(|badge| BadgeView {
            id: badge,
            name: badge.name().to_string(),
            description: badge.description().to_string(),
            icon: badge.icon().to_string(),
        })
        .collect()
}
