//! PromptSync Store: SQLite key-value areas, conversation cache, stored config.

pub mod cache;
pub mod config;
pub mod kv;
pub mod schema;

pub use cache::LocalCache;
pub use config::{StoredConfig, CONFIG_KEY};
pub use kv::{KvStore, StorageArea};
