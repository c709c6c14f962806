//! Habit tracking operations.
//!
//! Each mutation holds a per-user lock for its whole read-modify-write, so two
//! toggles from the same user cannot lose each other's ledger or xp update.

use crate::calendar::{Clock, date_key};
use crate::dashboard::compose_dashboard;
use crate::gamification::{BadgeFacts, Profile};
use crate::models::{DEFAULT_ICON, DashboardResponse, Habit, HabitView, ToggleResponse};
use crate::stats::habit_week;
use crate::storage::{StorageError, Store};
use crate::streak::{current_streak, streak_snapshot};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("not found")]
    NotFound,
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// One async mutex per user with a mutation in flight. An entry is removed
/// when its last holder or waiter lets go, so the map only holds active users.
#[derive(Clone, Default)]
struct UserLocks {
    inner: Arc<StdMutex<HashMap<String, Arc<Mutex<()>>>>>,
}

struct UserGuard {
    guard: Option<OwnedMutexGuard<()>>,
    user_id: String,
    locks: UserLocks,
}

impl UserLocks {
    fn map(&self) -> MutexGuard<'_, HashMap<String, Arc<Mutex<()>>>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn acquire(&self, user_id: &str) -> UserGuard {
        let lock = Arc::clone(self.map().entry(user_id.to_owned()).or_default());
        UserGuard {
            guard: Some(lock.lock_owned().await),
            user_id: user_id.to_owned(),
            locks: self.clone(),
        }
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.map().len()
    }
}

impl Drop for UserGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        let mut map = self.locks.map();
        if map
            .get(&self.user_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            map.remove(&self.user_id);
        }
    }
}

#[derive(Clone)]
pub struct HabitService {
    store: Arc<dyn Store>,
    clock: Clock,
    locks: UserLocks,
}

impl HabitService {
    pub fn new(store: Arc<dyn Store>, clock: Clock) -> Self {
        Self {
            store,
            clock,
            locks: UserLocks::default(),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub async fn create_habit(
        &self,
        user_id: &str,
        name: &str,
        icon: Option<&str>,
    ) -> Result<Habit, CoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::Validation("habit name is required".to_string()));
        }
        let icon = icon
            .map(str::trim)
            .filter(|icon| !icon.is_empty())
            .unwrap_or(DEFAULT_ICON);

        let _guard = self.locks.acquire(user_id).await;
        let habit = Habit::new(user_id, name, icon);
        let mut profile = self.profile_for(user_id).await?;

        let mut habits = self.store.list_habits(user_id).await?;
        habits.push(habit.clone());
        let awarded = profile.evaluate_badges(&self.badge_facts(&habits));

        if awarded.is_empty() {
            self.store.save_habit(&habit).await?;
        } else {
            self.store.commit(None, &habit, &profile).await?;
        }

        info!(user_id, habit_id = %habit.id, ?awarded, "habit created");
        Ok(habit)
    }

    pub async fn delete_habit(&self, user_id: &str, habit_id: &str) -> Result<(), CoreError> {
        let _guard = self.locks.acquire(user_id).await;
        self.owned_habit(user_id, habit_id).await?;
        if !self.store.delete_habit(habit_id).await? {
            return Err(CoreError::NotFound);
        }
        info!(user_id, habit_id, "habit deleted");
        Ok(())
    }

    pub async fn toggle_completion(
        &self,
        user_id: &str,
        habit_id: &str,
        currently_completed: bool,
    ) -> Result<ToggleResponse, CoreError> {
        let _guard = self.locks.acquire(user_id).await;
        let previous = self.owned_habit(user_id, habit_id).await?;
        let today = self.today();

        let mut habit = previous.clone();
        let toggle = habit
            .completed_dates
            .toggle(&date_key(today), currently_completed);
        let mut profile = self.profile_for(user_id).await?;

        if !toggle.changed {
            debug!(user_id, habit_id, status = ?toggle.status, "toggle left ledger unchanged");
            return Ok(ToggleResponse {
                status: toggle.status,
                new_level: profile.level(),
            });
        }

        profile.apply_delta(toggle.xp_delta());
        let habits: Vec<Habit> = self
            .store
            .list_habits(user_id)
            .await?
            .into_iter()
            .map(|stored| if stored.id == habit.id { habit.clone() } else { stored })
            .collect();
        let awarded = profile.evaluate_badges(&self.badge_facts(&habits));

        self.store.commit(Some(&previous), &habit, &profile).await?;

        info!(
            user_id,
            habit_id,
            status = ?toggle.status,
            xp = profile.xp,
            level = profile.level(),
            ?awarded,
            "habit toggled"
        );
        Ok(ToggleResponse {
            status: toggle.status,
            new_level: profile.level(),
        })
    }

    pub async fn get_dashboard(&self, user_id: &str) -> Result<DashboardResponse, CoreError> {
        // Read-only: a missing profile is shown as a fresh one but not stored
        // here, so this never races a locked mutation.
        let profile = self
            .store
            .load_profile(user_id)
            .await?
            .unwrap_or_else(|| Profile::new(user_id));
        let habits = self.store.list_habits(user_id).await?;
        Ok(compose_dashboard(&profile, &habits, self.today()))
    }

    pub async fn list_habits(&self, user_id: &str) -> Result<Vec<HabitView>, CoreError> {
        let habits = self.store.list_habits(user_id).await?;
        Ok(habits.into_iter().map(|habit| self.habit_view(habit)).collect())
    }

    /// Read-model for one habit with streaks and the last week, as of today.
    pub fn habit_view(&self, habit: Habit) -> HabitView {
        let today = self.today();
        let streak = streak_snapshot(&habit.completed_dates, today);
        HabitView {
            today_completed: habit.completed_dates.has(&date_key(today)),
            completed_dates: habit.completed_dates.keys().map(str::to_owned).collect(),
            last_7_days: habit_week(today, &habit.completed_dates),
            streak: streak.current,
            best_streak: streak.best,
            id: habit.id,
            name: habit.name,
            icon: habit.icon,
            created_at: habit.created_at,
        }
    }

    pub async fn reset_profile(&self, user_id: &str) -> Result<(), CoreError> {
        let _guard = self.locks.acquire(user_id).await;
        let mut profile = self.profile_for(user_id).await?;
        profile.reset();
        self.store.save_profile(&profile).await?;
        info!(user_id, "profile reset");
        Ok(())
    }

    /// Loads a habit, hiding habits owned by someone else behind `NotFound`.
    async fn owned_habit(&self, user_id: &str, habit_id: &str) -> Result<Habit, CoreError> {
        self.store
            .load_habit(habit_id)
            .await?
            .filter(|habit| habit.is_owned_by(user_id))
            .ok_or(CoreError::NotFound)
    }

    /// The user's profile, created and stored on first use.
    async fn profile_for(&self, user_id: &str) -> Result<Profile, CoreError> {
        if let Some(profile) = self.store.load_profile(user_id).await? {
            return Ok(profile);
        }
        let profile = Profile::new(user_id);
        self.store.save_profile(&profile).await?;
        debug!(user_id, "profile created");
        Ok(profile)
    }

    fn badge_facts(&self, habits: &[Habit]) -> BadgeFacts {
        let today = self.today();
        BadgeFacts {
            longest_current_streak: habits
                .iter()
                .map(|habit| current_streak(&habit.completed_dates, today))
                .max()
                .unwrap_or(0),
            total_habits: habits.len(),
        }
    }
}
