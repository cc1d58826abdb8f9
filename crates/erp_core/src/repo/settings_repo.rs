//! Application settings repository.
//!
//! Flags are stored as `'true'` / `'false'` text in `app_settings`.

use crate::model::settings::AppSettings;
use crate::repo::{RepoError, RepoResult};
use log::warn;
use rusqlite::{params, Connection};

/// Read/write access to application feature switches.
pub trait SettingsRepository {
    /// Loads every known flag, defaulting missing ones to `false`.
    fn load_settings(&self) -> RepoResult<AppSettings>;
    /// Upserts one flag by storage key.
    fn set_flag(&self, key: &str, value: bool) -> RepoResult<()>;
}

pub struct SqliteSettingsRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSettingsRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl SettingsRepository for SqliteSettingsRepository<'_> {
    fn load_settings(&self) -> RepoResult<AppSettings> {
        let mut stmt = self
            .conn
            .prepare("SELECT key, value FROM app_settings ORDER BY key ASC;")?;
        let mut rows = stmt.query([])?;
        let mut settings = AppSettings::default();
        while let Some(row) = rows.next()? {
            let key: String = row.get("key")?;
            let raw: String = row.get("value")?;
            let value = parse_flag(&key, &raw)?;
            if !settings.apply_flag(&key, value) {
                warn!("event=settings_load module=settings status=skipped key={key} reason=unknown_key");
            }
        }

        Ok(settings)
    }

    fn set_flag(&self, key: &str, value: bool) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO app_settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value;",
            params![key, if value { "true" } else { "false" }],
        )?;
        Ok(())
    }
}

fn parse_flag(key: &str, raw: &str) -> RepoResult<bool> {
    match raw.trim() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(RepoError::InvalidData(format!(
            "invalid flag value `{other}` for app_settings key `{key}`"
        ))),
    }
}
