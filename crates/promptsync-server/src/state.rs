//! Shared application state.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::info;

use promptsync_core::{ConfigProvider, Result, ServerSettings};
use promptsync_protocol::{LocalBus, MessageChannel};
use promptsync_runtime::Background;
use promptsync_store::{KvStore, LocalCache, StoredConfig};
use promptsync_sync::{RemoteClient, SyncEngine};

/// Shared application state accessible from all route handlers.
pub struct AppState {
    pub settings: ServerSettings,
    pub bus: Arc<LocalBus>,
    pub channel: MessageChannel,
    pub cache: LocalCache,
    pub config: Arc<StoredConfig>,
    pub engine: Arc<SyncEngine>,
    background_task: JoinHandle<()>,
}

impl AppState {
    /// Open storage, persist initial config, and attach the background responder.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn new(settings: ServerSettings) -> Result<Self> {
        let kv = Arc::new(KvStore::open(&settings.data_paths.database)?);
        let cache = LocalCache::new(kv.clone());
        let config = Arc::new(StoredConfig::new(kv));
        let initial = config.ensure_initialized()?;

        let engine = Arc::new(SyncEngine::new(
            RemoteClient::new()?,
            cache.clone(),
            config.clone(),
        ));

        let bus = Arc::new(LocalBus::new());
        let background = Arc::new(Background::new(cache.clone(), engine.clone(), config.clone()));
        let background_task = background.attach(&bus);
        let channel = MessageChannel::new(bus.clone());

        info!(
            "Background ready: endpoint={}, autoSync={}",
            initial.remote_endpoint, initial.auto_sync
        );

        Ok(Self {
            settings,
            bus,
            channel,
            cache,
            config,
            engine,
            background_task,
        })
    }

    /// The sync interval currently configured.
    pub fn sync_interval(&self) -> Result<std::time::Duration> {
        Ok(self.config.load()?.sync_interval())
    }
}

impl Drop for AppState {
    fn drop(&mut self) {
        self.background_task.abort();
    }
}
