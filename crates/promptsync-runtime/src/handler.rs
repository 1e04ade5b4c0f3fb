//! Extraction request handling: validate → cache → push (if auto-sync) → respond.

use std::sync::Arc;

use tracing::{error, info};

use promptsync_core::{ConfigProvider, ConversationRecord, ExtractionOutcome, Result};
use promptsync_store::LocalCache;
use promptsync_sync::SyncEngine;

pub struct ExtractionHandler {
    cache: LocalCache,
    engine: Arc<SyncEngine>,
    config: Arc<dyn ConfigProvider>,
}

impl ExtractionHandler {
    pub fn new(
        cache: LocalCache,
        engine: Arc<SyncEngine>,
        config: Arc<dyn ConfigProvider>,
    ) -> Self {
        Self {
            cache,
            engine,
            config,
        }
    }

    /// Accept one extracted record.
    ///
    /// The cache write completes before any push is issued. A failed push
    /// fails the call but leaves the cached record in place. The auto-sync
    /// gate and the push endpoint come from the same config snapshot.
    pub async fn handle(&self, record: ConversationRecord) -> Result<ExtractionOutcome> {
        record.validate()?;
        let config = self.config.load()?;
        let record = record.normalized();

        let key = self.cache.store(&record).map_err(|e| {
            error!("Error caching conversation {}: {}", record.key(), e);
            e
        })?;

        if config.auto_sync {
            if let Err(e) = self.engine.push_with(&config, &record).await {
                error!("Error handling conversation extraction {}: {}", key, e);
                return Err(e);
            }
        }

        info!(
            "Conversation {} saved ({} messages, synced={})",
            key,
            record.messages.len(),
            config.auto_sync
        );
        Ok(ExtractionOutcome {
            saved: true,
            synced: config.auto_sync,
        })
    }
}
