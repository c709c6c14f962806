use crate::gamification::Profile;
use crate::models::{AppData, Habit};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::{fs, sync::Mutex};
use tracing::{debug, error};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Persistence capability the habit service is written against.
#[async_trait]
pub trait Store: Send + Sync {
    async fn load_habit(&self, id: &str) -> Result<Option<Habit>, StorageError>;

    async fn save_habit(&self, habit: &Habit) -> Result<(), StorageError>;

    /// Returns whether a habit was removed.
    async fn delete_habit(&self, id: &str) -> Result<bool, StorageError>;

    /// A user's habits, most recently created first.
    async fn list_habits(&self, user_id: &str) -> Result<Vec<Habit>, StorageError>;

    async fn load_profile(&self, user_id: &str) -> Result<Option<Profile>, StorageError>;

    async fn save_profile(&self, profile: &Profile) -> Result<(), StorageError>;

    /// Writes a habit and its owner's profile as one unit.
    ///
    /// `previous` is the habit as it was loaded (`None` for a new habit) and
    /// is restored if the profile write fails.
    async fn commit(
        &self,
        previous: Option<&Habit>,
        habit: &Habit,
        profile: &Profile,
    ) -> Result<(), StorageError> {
        self.save_habit(habit).await?;
        if let Err(err) = self.save_profile(profile).await {
            let restored = match previous {
                Some(previous) => self.save_habit(previous).await,
                None => self.delete_habit(&habit.id).await.map(|_| ()),
            };
            if let Err(restore_err) = restored {
                error!(habit_id = %habit.id, "failed to restore habit after profile write error: {restore_err}");
            }
            return Err(err);
        }
        Ok(())
    }
}

impl AppData {
    fn habits_for(&self, user_id: &str) -> Vec<Habit> {
        let mut habits: Vec<Habit> = self
            .habits
            .values()
            .filter(|habit| habit.is_owned_by(user_id))
            .cloned()
            .collect();
        habits.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        habits
    }

    fn put_habit(&mut self, habit: &Habit) {
        self.habits.insert(habit.id.clone(), habit.clone());
    }

    fn put_profile(&mut self, profile: &Profile) {
        self.profiles.insert(profile.user_id.clone(), profile.clone());
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Mutex<AppData>,
}

impl MemoryStore {
    pub fn new(data: AppData) -> Self {
        Self {
            data: Mutex::new(data),
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn load_habit(&self, id: &str) -> Result<Option<Habit>, StorageError> {
        Ok(self.data.lock().await.habits.get(id).cloned())
    }

    async fn save_habit(&self, habit: &Habit) -> Result<(), StorageError> {
        self.data.lock().await.put_habit(habit);
        Ok(())
    }

    async fn delete_habit(&self, id: &str) -> Result<bool, StorageError> {
        Ok(self.data.lock().await.habits.remove(id).is_some())
    }

    async fn list_habits(&self, user_id: &str) -> Result<Vec<Habit>, StorageError> {
        Ok(self.data.lock().await.habits_for(user_id))
    }

    async fn load_profile(&self, user_id: &str) -> Result<Option<Profile>, StorageError> {
        Ok(self.data.lock().await.profiles.get(user_id).cloned())
    }

    async fn save_profile(&self, profile: &Profile) -> Result<(), StorageError> {
        self.data.lock().await.put_profile(profile);
        Ok(())
    }

    async fn commit(
        &self,
        _previous: Option<&Habit>,
        habit: &Habit,
        profile: &Profile,
    ) -> Result<(), StorageError> {
        let mut data = self.data.lock().await;
        data.put_habit(habit);
        data.put_profile(profile);
        Ok(())
    }
}

/// Whole-document JSON store. Every write rewrites the file and only updates
/// the in-memory copy once the file write succeeded.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    data: Mutex<AppData>,
}

impl JsonFileStore {
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let data = load_data(&path).await?;
        Ok(Self {
            path,
            data: Mutex::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn update<T>(&self, apply: impl FnOnce(&mut AppData) -> T) -> Result<T, StorageError> {
        let mut data = self.data.lock().await;
        let mut next = data.clone();
        let result = apply(&mut next);
        persist_data(&self.path, &next).await?;
        *data = next;
        Ok(result)
    }
}

#[async_trait]
impl Store for JsonFileStore {
    async fn load_habit(&self, id: &str) -> Result<Option<Habit>, StorageError> {
        Ok(self.data.lock().await.habits.get(id).cloned())
    }

    async fn save_habit(&self, habit: &Habit) -> Result<(), StorageError> {
        self.update(|data| data.put_habit(habit)).await
    }

    async fn delete_habit(&self, id: &str) -> Result<bool, StorageError> {
        if !self.data.lock().await.habits.contains_key(id) {
            return Ok(false);
        }
        self.update(|data| data.habits.remove(id).is_some()).await
    }

    async fn list_habits(&self, user_id: &str) -> Result<Vec<Habit>, StorageError> {
        Ok(self.data.lock().await.habits_for(user_id))
    }

    async fn load_profile(&self, user_id: &str) -> Result<Option<Profile>, StorageError> {
        Ok(self.data.lock().await.profiles.get(user_id).cloned())
    }

    async fn save_profile(&self, profile: &Profile) -> Result<(), StorageError> {
        self.update(|data| data.put_profile(profile)).await
    }

    async fn commit(
        &self,
        _previous: Option<&Habit>,
        habit: &Habit,
        profile: &Profile,
    ) -> Result<(), StorageError> {
        self.update(|data| {
            data.put_habit(habit);
            data.put_profile(profile);
        })
        .await
    }
}

/// Reads the data file. A missing file is an empty store; anything unreadable
/// is an error so the next write cannot replace data that failed to load.
pub async fn load_data(path: &Path) -> Result<AppData, StorageError> {
    match fs::read(path).await {
        Ok(bytes) => serde_json::from_slice(&bytes).map_err(|err| {
            error!(path = %path.display(), "failed to parse data file: {err}");
            StorageError::from(err)
        }),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(AppData::default()),
        Err(err) => {
            error!(path = %path.display(), "failed to read data file: {err}");
            Err(err.into())
        }
    }
}

pub async fn persist_data(path: &Path, data: &AppData) -> Result<(), StorageError> {
    let payload = serde_json::to_vec_pretty(data)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, payload).await?;
    fs::rename(&tmp, path).await?;
    debug!(path = %path.display(), "persisted data file");
    Ok(())
}
