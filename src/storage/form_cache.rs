use rusqlite::{Connection, OptionalExtension, Result as SqlResult, params};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::common::ConnectForm;

const FORM_KEY: &str = "connectionFormData";

/// The remembered subset of the connect form. The secret key is never stored.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SavedForm {
    #[serde(default)]
    nickname: String,
    #[serde(default)]
    ip_address: String,
    #[serde(default)]
    port: String,
}

/// Local key-value cache that restores the connect form between runs.
pub struct FormCache {
    conn: Connection,
}

impl FormCache {
    pub fn with_path<P: AsRef<Path>>(path: P) -> SqlResult<Self> {
        let cache = Self {
            conn: Connection::open(path)?,
        };
        cache.init_schema()?;
        Ok(cache)
    }

    #[cfg(test)]
    pub fn in_memory() -> SqlResult<Self> {
        let cache = Self {
            conn: Connection::open_in_memory()?,
        };
        cache.init_schema()?;
        Ok(cache)
    }

    fn init_schema(&self) -> SqlResult<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS kv_cache (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
            )",
            [],
        )?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> SqlResult<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM kv_cache WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
    }

    pub fn set(&self, key: &str, value: &str) -> SqlResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv_cache (key, value, updated_at)
             VALUES (?1, ?2, strftime('%s', 'now'))",
            params![key, value],
        )?;
        Ok(())
    }

    /// Remember nickname, server ip and port from `form`.
    pub fn save_form(&self, form: &ConnectForm) {
        let saved = SavedForm {
            nickname: form.nickname.clone(),
            ip_address: form.ip_address.clone(),
            port: form.port.clone(),
        };
        let json = match serde_json::to_string(&saved) {
            Ok(json) => json,
            Err(err) => {
                log::warn!("Failed to serialize connect form: {err}");
                return;
            }
        };
        if let Err(err) = self.set(FORM_KEY, &json) {
            log::warn!("Failed to persist connect form: {err}");
        }
    }

    /// Previously saved form values; empty fields when nothing usable is stored.
    pub fn restore_form(&self) -> ConnectForm {
        let saved = match self.get(FORM_KEY) {
            Ok(Some(json)) => serde_json::from_str::<SavedForm>(&json).unwrap_or_else(|err| {
                log::warn!("Ignoring unreadable saved connect form: {err}");
                SavedForm::default()
            }),
            Ok(None) => SavedForm::default(),
            Err(err) => {
                log::warn!("Failed to read saved connect form: {err}");
                SavedForm::default()
            }
        };

        ConnectForm {
            nickname: saved.nickname,
            secret_key: String::new(),
            ip_address: saved.ip_address,
            port: saved.port,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> ConnectForm {
        ConnectForm {
            nickname: "alice".into(),
            secret_key: "hunter2".into(),
            ip_address: "192.168.1.10".into(),
            port: "12345".into(),
        }
    }

    #[test]
    fn restores_saved_form_without_secret() {
        let cache = FormCache::in_memory().unwrap();
        cache.save_form(&form());

        let restored = cache.restore_form();
        assert_eq!(restored.nickname, "alice");
        assert_eq!(restored.ip_address, "192.168.1.10");
        assert_eq!(restored.port, "12345");
        assert!(restored.secret_key.is_empty());
        assert!(!cache.get(FORM_KEY).unwrap().unwrap().contains("hunter2"));
    }

    #[test]
    fn empty_cache_restores_blank_form() {
        let cache = FormCache::in_memory().unwrap();
        assert_eq!(cache.restore_form(), ConnectForm::default());
    }

    #[test]
    fn corrupt_entry_restores_blank_form() {
        let cache = FormCache::in_memory().unwrap();
        cache.set(FORM_KEY, "{not json").unwrap();
        assert_eq!(cache.restore_form(), ConnectForm::default());
    }

    #[test]
    fn later_save_overwrites_earlier() {
        let cache = FormCache::in_memory().unwrap();
        cache.save_form(&form());
        let mut changed = form();
        changed.port = "9999".into();
        cache.save_form(&changed);
        assert_eq!(cache.restore_form().port, "9999");
    }

    #[test]
    fn persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.db");
        FormCache::with_path(&path).unwrap().save_form(&form());
        assert_eq!(FormCache::with_path(&path).unwrap().restore_form().nickname, "alice");
    }
}
