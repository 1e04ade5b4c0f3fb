//! Background responder: routes protocol actions to their handlers.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::handler::ExtractionHandler;
use promptsync_core::{ConfigProvider, Error, Result};
use promptsync_protocol::{LocalBus, Request, Response, Target};
use promptsync_store::LocalCache;
use promptsync_sync::SyncEngine;

pub struct Background {
    handler: ExtractionHandler,
    engine: Arc<SyncEngine>,
    cache: LocalCache,
    config: Arc<dyn ConfigProvider>,
}

impl Background {
    pub fn new(
        cache: LocalCache,
        engine: Arc<SyncEngine>,
        config: Arc<dyn ConfigProvider>,
    ) -> Self {
        Self {
            handler: ExtractionHandler::new(cache.clone(), engine.clone(), config.clone()),
            engine,
            cache,
            config,
        }
    }

    /// Answer one request. Failures become `{success: false, error}`.
    pub async fn respond(&self, request: Request) -> Response {
        let action = request.action();
        debug!("background <- {}", action);
        match self.dispatch(request).await {
            Ok(response) => response,
            Err(e) => {
                error!("Error handling {}: {}", action, e);
                Response::from_error(&e)
            }
        }
    }

    async fn dispatch(&self, request: Request) -> Result<Response> {
        match request {
            Request::ExtractConversation { data: Some(record) } => {
                let outcome = self.handler.handle(record).await?;
                Ok(Response::with_data(&outcome))
            }
            Request::ExtractConversation { data: None } => {
                Err(Error::Extraction("missing conversation payload".into()))
            }
            Request::GetConfig => Ok(Response::with_config(self.config.load()?)),
            Request::SaveConfig { config } => Ok(Response::with_config(self.config.save(config)?)),
            Request::SyncAll => {
                let result = self.engine.sync_all().await;
                Ok(Response::with_data(&result))
            }
            Request::ListHistories => Ok(Response::with_data(&self.cache.histories()?)),
        }
    }

    /// Register as the background target on `bus` and serve until it closes.
    pub fn attach(self: Arc<Self>, bus: &LocalBus) -> JoinHandle<()> {
        bus.register(Target::Background).serve(move |request| {
            let background = self.clone();
            async move { background.respond(request).await }
        })
    }
}
