//! Single-record push and batch sync over the conversation cache.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::client::RemoteClient;
use promptsync_core::{Config, ConfigProvider, ConversationRecord, Result, SyncResult};
use promptsync_store::LocalCache;

pub struct SyncEngine {
    client: RemoteClient,
    cache: LocalCache,
    config: Arc<dyn ConfigProvider>,
}

impl SyncEngine {
    pub fn new(client: RemoteClient, cache: LocalCache, config: Arc<dyn ConfigProvider>) -> Self {
        Self {
            client,
            cache,
            config,
        }
    }

    /// Push one record to the configured endpoint. Always surfaces failure.
    pub async fn push(&self, record: &ConversationRecord) -> Result<serde_json::Value> {
        let config = self.config.load()?;
        self.push_with(&config, record).await
    }

    /// Push one record using a config snapshot the caller already holds.
    pub async fn push_with(
        &self,
        config: &Config,
        record: &ConversationRecord,
    ) -> Result<serde_json::Value> {
        self.client.push(&config.remote_endpoint, record).await
    }

    /// Timer entry point: a no-op unless auto-sync is enabled.
    pub async fn periodic_sync(&self) -> SyncResult {
        match self.config.load() {
            Ok(config) if !config.auto_sync => SyncResult::default(),
            Ok(config) => self.sync_with(&config).await,
            Err(e) => {
                error!("Error during periodic sync: {}", e);
                SyncResult::default()
            }
        }
    }

    /// Push every cached record, each independently.
    ///
    /// Per-record failures are logged and collected; none aborts the batch
    /// and none is returned as an error.
    pub async fn sync_all(&self) -> SyncResult {
        match self.config.load() {
            Ok(config) => self.sync_with(&config).await,
            Err(e) => {
                error!("Error during batch sync: {}", e);
                SyncResult::default()
            }
        }
    }

    async fn sync_with(&self, config: &Config) -> SyncResult {
        let mut result = SyncResult::default();
        let endpoint = &config.remote_endpoint;

        let records = match self.cache.histories() {
            Ok(records) => records,
            Err(e) => {
                error!("Error reading cached histories: {}", e);
                return result;
            }
        };

        for record in &records {
            match self.client.push(endpoint, record).await {
                Ok(_) => result.record_success(),
                Err(e) => {
                    warn!("Failed to sync conversation {}: {}", record.conversation_id, e);
                    result.record_failure(&record.conversation_id, &e);
                }
            }
        }

        if result.attempted > 0 {
            info!(
                "Batch sync: {}/{} succeeded, {} failed",
                result.succeeded,
                result.attempted,
                result.failed()
            );
        }
        result
    }
}
