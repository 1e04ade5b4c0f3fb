//! Conversation cache: last-write-wins records under `history_*` keys.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::kv::{KvStore, StorageArea};
use promptsync_core::{ConversationRecord, Result, HISTORY_PREFIX};

/// Durable cache of extracted conversations. No eviction.
#[derive(Clone)]
pub struct LocalCache {
    kv: Arc<KvStore>,
}

impl LocalCache {
    pub fn new(kv: Arc<KvStore>) -> Self {
        Self { kv }
    }

    /// Write `record` under `key`, replacing any previous value.
    pub fn put(&self, key: &str, record: &ConversationRecord) -> Result<()> {
        self.kv.set(StorageArea::Local, key, record)?;
        debug!("Cached {} ({} messages)", key, record.messages.len());
        Ok(())
    }

    /// Write `record` under its derived key and return the key.
    pub fn store(&self, record: &ConversationRecord) -> Result<String> {
        let key = record.key();
        self.put(&key, record)?;
        Ok(key)
    }

    pub fn get(&self, key: &str) -> Result<Option<ConversationRecord>> {
        self.kv.get(StorageArea::Local, key)
    }

    /// Every record whose key starts with `prefix`.
    ///
    /// Values that no longer parse as records are skipped with a warning.
    pub fn get_all(&self, prefix: &str) -> Result<Vec<ConversationRecord>> {
        let entries = self.kv.entries_raw(StorageArea::Local, prefix)?;
        let mut records = Vec::with_capacity(entries.len());
        for (key, raw) in entries {
            match serde_json::from_str::<ConversationRecord>(&raw) {
                Ok(record) => records.push(record),
                Err(e) => warn!("Skipping unreadable cache entry {}: {}", key, e),
            }
        }
        Ok(records)
    }

    /// All cached conversations.
    pub fn histories(&self) -> Result<Vec<ConversationRecord>> {
        self.get_all(HISTORY_PREFIX)
    }

    pub fn remove(&self, key: &str) -> Result<bool> {
        self.kv.remove(StorageArea::Local, key)
    }
}
