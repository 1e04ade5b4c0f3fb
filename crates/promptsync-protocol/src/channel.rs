//! Timeout-guarded request/response channel.
//!
//! `send` hands the request to a `Transport` together with an `Ack`, then
//! waits for whichever settles first: the acknowledgment or the deadline.
//! A lost race only drops the waiting side; the transport call itself is
//! never cancelled. No retries happen here.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tracing::debug;

use crate::messages::{Request, Response};
use promptsync_core::{Error, Result};

/// Deadline applied when the caller does not pass one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(8000);

/// Reported when the responder dropped its acknowledgment without replying.
pub const PORT_CLOSED: &str = "The message port closed before a response was received.";

/// Destination scope of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    /// The privileged background process.
    Background,
    /// The page context running in a given tab.
    Tab(u32),
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Background => write!(f, "background"),
            Self::Tab(id) => write!(f, "tab:{}", id),
        }
    }
}

/// One-shot acknowledgment callback handed to the transport.
pub struct Ack {
    tx: oneshot::Sender<std::result::Result<Response, String>>,
}

impl Ack {
    pub fn new() -> (Self, oneshot::Receiver<std::result::Result<Response, String>>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    /// Deliver the responder's reply. Returns false if nobody is waiting anymore.
    pub fn respond(self, response: Response) -> bool {
        self.tx.send(Ok(response)).is_ok()
    }

    /// Report a delivery/connection error.
    pub fn fail(self, message: impl Into<String>) -> bool {
        self.tx.send(Err(message.into())).is_ok()
    }
}

/// Underlying delivery mechanism with callback-style acknowledgment.
pub trait Transport: Send + Sync {
    fn dispatch(&self, target: Target, request: Request, ack: Ack);
}

#[derive(Clone)]
pub struct MessageChannel {
    transport: Arc<dyn Transport>,
    default_timeout: Duration,
}

impl MessageChannel {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            default_timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Send `request` to `target` and await the reply.
    ///
    /// `None` applies the default deadline; `Some(Duration::ZERO)` disables it,
    /// leaving completion to the transport.
    pub async fn send(
        &self,
        target: Target,
        request: Request,
        timeout: Option<Duration>,
    ) -> Result<Response> {
        let timeout = timeout.unwrap_or(self.default_timeout);
        let action = request.action();
        debug!("send {} -> {}", action, target);

        let (ack, rx) = Ack::new();
        self.transport.dispatch(target, request, ack);

        let pending = async move {
            match rx.await {
                Ok(Ok(response)) => Ok(response),
                Ok(Err(message)) => Err(Error::Transport(message)),
                Err(_) => Err(Error::Transport(PORT_CLOSED.into())),
            }
        };

        if timeout.is_zero() {
            return pending.await;
        }

        match tokio::time::timeout(timeout, pending).await {
            Ok(result) => result,
            Err(_) => {
                debug!("{} -> {} timed out after {:?}", action, target, timeout);
                Err(Error::Timeout(timeout))
            }
        }
    }

    pub async fn send_to_tab(
        &self,
        tab_id: u32,
        request: Request,
        timeout: Option<Duration>,
    ) -> Result<Response> {
        self.send(Target::Tab(tab_id), request, timeout).await
    }

    pub async fn send_to_background(
        &self,
        request: Request,
        timeout: Option<Duration>,
    ) -> Result<Response> {
        self.send(Target::Background, request, timeout).await
    }
}
