use crate::domain::models::TimerConfig;
use crate::infrastructure::error::CoreError;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const TIMER_CONFIG_KEY: &str = "timer_config";

const PREFERENCES_SCHEMA: &str = "CREATE TABLE IF NOT EXISTS preferences (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)";

pub fn initialize_preferences(path: &Path) -> Result<(), CoreError> {
    let connection = Connection::open(path)?;
    connection.execute_batch(PREFERENCES_SCHEMA)?;
    Ok(())
}

/// Session-to-session cache for timer settings. A missing or unreadable cache
/// is not an error; callers fall back to `TimerConfig::default()`.
pub trait PreferencesRepository: Send + Sync {
    fn load_timer_config(&self) -> Result<Option<TimerConfig>, CoreError>;
    fn save_timer_config(&self, config: &TimerConfig) -> Result<(), CoreError>;
}

#[derive(Debug, Clone)]
pub struct SqlitePreferencesRepository {
    db_path: PathBuf,
}

impl SqlitePreferencesRepository {
    pub fn new(db_path: impl AsRef<Path>) -> Self {
        Self {
            db_path: db_path.as_ref().to_path_buf(),
        }
    }

    fn connect(&self) -> Result<Connection, CoreError> {
        Connection::open(&self.db_path).map_err(CoreError::from)
    }
}

impl PreferencesRepository for SqlitePreferencesRepository {
    fn load_timer_config(&self) -> Result<Option<TimerConfig>, CoreError> {
        let connection = self.connect()?;
        let raw: Option<String> = connection
            .query_row(
                "SELECT value FROM preferences WHERE key = ?1",
                params![TIMER_CONFIG_KEY],
                |row| row.get(0),
            )
            .optional()?;

        let Some(raw) = raw else {
            return Ok(None);
        };

        // A corrupt cached value degrades to the defaults instead of failing.
        Ok(serde_json::from_str::<TimerConfig>(&raw).ok())
    }

    fn save_timer_config(&self, config: &TimerConfig) -> Result<(), CoreError> {
        let payload = serde_json::to_string(config)?;
        let connection = self.connect()?;
        connection.execute(
            "INSERT INTO preferences (key, value)
             VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![TIMER_CONFIG_KEY, payload],
        )?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryPreferencesRepository {
    timer_config: Mutex<Option<TimerConfig>>,
}

impl PreferencesRepository for InMemoryPreferencesRepository {
    fn load_timer_config(&self) -> Result<Option<TimerConfig>, CoreError> {
        let guard = self
            .timer_config
            .lock()
            .map_err(|error| CoreError::Lock(error.to_string()))?;
        Ok(guard.clone())
    }

    fn save_timer_config(&self, config: &TimerConfig) -> Result<(), CoreError> {
        let mut guard = self
            .timer_config
            .lock()
            .map_err(|error| CoreError::Lock(error.to_string()))?;
        *guard = Some(config.clone());
        Ok(())
    }
}
