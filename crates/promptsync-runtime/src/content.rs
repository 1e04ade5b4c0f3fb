//! Page-context agent: extracts the current page and hands it to the background.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use promptsync_core::{ConversationRecord, Result};
use promptsync_extract::{PageSnapshot, ProviderRegistry};
use promptsync_protocol::{LocalBus, MessageChannel, Request, Response, Target};

pub struct ContentAgent {
    tab_id: u32,
    registry: ProviderRegistry,
    page: RwLock<PageSnapshot>,
    channel: MessageChannel,
}

impl ContentAgent {
    pub fn new(
        tab_id: u32,
        registry: ProviderRegistry,
        page: PageSnapshot,
        channel: MessageChannel,
    ) -> Self {
        Self {
            tab_id,
            registry,
            page: RwLock::new(page),
            channel,
        }
    }

    pub fn tab_id(&self) -> u32 {
        self.tab_id
    }

    /// Replace the snapshot after the page changed.
    pub fn update_page(&self, page: PageSnapshot) {
        *self.page.write() = page;
    }

    /// Extract the current page and submit it to the background.
    ///
    /// Extraction failures never reach the background.
    pub async fn extract_and_submit(&self) -> Result<ConversationRecord> {
        let page = self.page.read().clone();
        let record = self.registry.extract(&page)?;

        let response = self
            .channel
            .send_to_background(
                Request::ExtractConversation {
                    data: Some(record.clone()),
                },
                None,
            )
            .await?;
        if !response.success {
            let e = response.to_error();
            error!("Background failed to save {}: {}", record.key(), e);
            return Err(e);
        }

        debug!("tab {} submitted {}", self.tab_id, record.key());
        Ok(record)
    }

    async fn respond(&self, request: Request) -> Response {
        match request {
            Request::ExtractConversation { data: None } => match self.extract_and_submit().await {
                Ok(record) => Response::with_data(&record),
                Err(e) => {
                    error!("Error extracting conversation in tab {}: {}", self.tab_id, e);
                    Response::from_error(&e)
                }
            },
            _ => Response::failure("Unknown action"),
        }
    }

    /// Register as this tab's responder on `bus`.
    pub fn attach(self: Arc<Self>, bus: &LocalBus) -> JoinHandle<()> {
        bus.register(Target::Tab(self.tab_id)).serve(move |request| {
            let agent = self.clone();
            async move { agent.respond(request).await }
        })
    }
}
