//! SQLite-backed key-value store with two storage areas.
//!
//! Every call is a discrete point operation under the connection lock, so
//! callers never observe a half-applied write.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::schema::SCHEMA_SQL;
use promptsync_core::{Error, Result};

/// Storage area, mirroring the browser's local/synchronized split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageArea {
    /// Device-local data (conversation cache).
    Local,
    /// Settings that follow the user (configuration).
    Sync,
}

impl StorageArea {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Sync => "sync",
        }
    }
}

pub struct KvStore {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl KvStore {
    /// Open or create the store at `db_path`.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::Storage(e.to_string()))?;
        }

        let conn = Connection::open(db_path).map_err(|e| Error::Database(e.to_string()))?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )
        .map_err(|e| Error::Database(e.to_string()))?;
        Self::init_schema(&conn)?;

        let store = Self {
            conn: Mutex::new(conn),
            db_path: Some(db_path.to_path_buf()),
        };
        info!(
            "KvStore initialized: {} local keys, path={}",
            store.count(StorageArea::Local)?,
            db_path.display()
        );
        Ok(store)
    }

    /// Open a throwaway in-memory store.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| Error::Database(e.to_string()))?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            db_path: None,
        })
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(SCHEMA_SQL)
            .map_err(|e| Error::Database(format!("Schema init failed: {}", e)))
    }

    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    // ---------------------------------------------------------------
    // Raw JSON access
    // ---------------------------------------------------------------

    pub fn get_raw(&self, area: StorageArea, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock();
        let value = conn
            .prepare_cached("SELECT value FROM kv WHERE area = ?1 AND key = ?2")
            .map_err(|e| Error::Database(e.to_string()))?
            .query_row(params![area.name(), key], |row| row.get(0))
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(value)
    }

    pub fn set_raw(&self, area: StorageArea, key: &str, value: &str) -> Result<()> {
        let now = chrono::Utc::now().timestamp_millis();
        let conn = self.conn.lock();
        conn.prepare_cached(
            "INSERT INTO kv (area, key, value, updated_at) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(area, key)
             DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .map_err(|e| Error::Database(e.to_string()))?
        .execute(params![area.name(), key, value, now])
        .map_err(|e| Error::Database(e.to_string()))?;
        debug!("kv set {}:{}", area.name(), key);
        Ok(())
    }

    /// All `(key, value)` pairs in `area` whose key starts with `prefix`, by key.
    pub fn entries_raw(&self, area: StorageArea, prefix: &str) -> Result<Vec<(String, String)>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached(
                "SELECT key, value FROM kv
                 WHERE area = ?1 AND substr(key, 1, length(?2)) = ?2
                 ORDER BY key",
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        let rows = stmt
            .query_map(params![area.name(), prefix], |row| Ok((row.get(0)?, row.get(1)?)))
            .map_err(|e| Error::Database(e.to_string()))?;
        let entries = rows
            .collect::<std::result::Result<Vec<(String, String)>, _>>()
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(entries)
    }

    // ---------------------------------------------------------------
    // Typed access
    // ---------------------------------------------------------------

    pub fn get<T: DeserializeOwned>(&self, area: StorageArea, key: &str) -> Result<Option<T>> {
        match self.get_raw(area, key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn set<T: Serialize>(&self, area: StorageArea, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.set_raw(area, key, &raw)
    }

    pub fn remove(&self, area: StorageArea, key: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let n = conn
            .execute(
                "DELETE FROM kv WHERE area = ?1 AND key = ?2",
                params![area.name(), key],
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(n > 0)
    }

    /// Remove every key in `area`.
    pub fn clear(&self, area: StorageArea) -> Result<usize> {
        let conn = self.conn.lock();
        conn.execute("DELETE FROM kv WHERE area = ?1", params![area.name()])
            .map_err(|e| Error::Database(e.to_string()))
    }

    pub fn count(&self, area: StorageArea) -> Result<usize> {
        let conn = self.conn.lock();
        let n: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM kv WHERE area = ?1",
                params![area.name()],
                |row| row.get(0),
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(n as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store() -> (KvStore, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = KvStore::open(dir.path().join("promptsync.db")).unwrap();
        (store, dir)
    }

    #[test]
    fn test_set_get_overwrite() {
        let (store, _dir) = test_store();
        assert!(store.get_raw(StorageArea::Local, "a").unwrap().is_none());

        store.set(StorageArea::Local, "a", &serde_json::json!({"v": 1})).unwrap();
        store.set(StorageArea::Local, "a", &serde_json::json!({"v": 2})).unwrap();

        let v: serde_json::Value = store.get(StorageArea::Local, "a").unwrap().unwrap();
        assert_eq!(v["v"], 2);
        assert_eq!(store.count(StorageArea::Local).unwrap(), 1);
    }

    #[test]
    fn test_areas_are_isolated() {
        let (store, _dir) = test_store();
        store.set_raw(StorageArea::Sync, "config", "{}").unwrap();
        assert!(store.get_raw(StorageArea::Local, "config").unwrap().is_none());
        assert_eq!(store.clear(StorageArea::Local).unwrap(), 0);
        assert!(store.get_raw(StorageArea::Sync, "config").unwrap().is_some());
    }

    #[test]
    fn test_prefix_filter() {
        let store = KvStore::open_in_memory().unwrap();
        store.set_raw(StorageArea::Local, "history_Claude_abc", "1").unwrap();
        store.set_raw(StorageArea::Local, "history_ChatGPT_x", "2").unwrap();
        store.set_raw(StorageArea::Local, "settings_ui", "3").unwrap();
        store.set_raw(StorageArea::Local, "history%_like", "4").unwrap();

        let keys: Vec<String> = store
            .entries_raw(StorageArea::Local, "history_")
            .unwrap()
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec!["history_ChatGPT_x", "history_Claude_abc"]);
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("promptsync.db");
        {
            let store = KvStore::open(&path).unwrap();
            store.set_raw(StorageArea::Local, "k", "\"v\"").unwrap();
        }
        let store = KvStore::open(&path).unwrap();
        assert_eq!(
            store.get_raw(StorageArea::Local, "k").unwrap().as_deref(),
            Some("\"v\"")
        );
        assert!(store.remove(StorageArea::Local, "k").unwrap());
        assert!(!store.remove(StorageArea::Local, "k").unwrap());
    }
}
