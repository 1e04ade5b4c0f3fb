//! In-process message bus implementing `Transport`.
//!
//! Each target registers an `Inbox`. Delivery to an unregistered target
//! fails the acknowledgment immediately.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::channel::{Ack, Target, Transport};
use crate::messages::{Request, Response};

/// Reported when no responder is registered for the target.
pub const NO_RECEIVER: &str = "Could not establish connection. Receiving end does not exist.";

/// A delivered request and the acknowledgment to answer it with.
pub struct Envelope {
    pub target: Target,
    pub request: Request,
    ack: Ack,
}

impl Envelope {
    pub fn reply(self, response: Response) {
        if !self.ack.respond(response) {
            debug!("reply to {} dropped: caller no longer waiting", self.target);
        }
    }
}

/// Receiving side of a registered target.
pub struct Inbox {
    target: Target,
    rx: mpsc::UnboundedReceiver<Envelope>,
}

impl Inbox {
    pub fn target(&self) -> Target {
        self.target
    }

    pub async fn recv(&mut self) -> Option<Envelope> {
        self.rx.recv().await
    }

    /// Answer every request with `handler`, each on its own task so slow
    /// handlers interleave instead of queueing.
    pub fn serve<F, Fut>(mut self, handler: F) -> JoinHandle<()>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        let handler = Arc::new(handler);
        tokio::spawn(async move {
            while let Some(envelope) = self.rx.recv().await {
                let handler = handler.clone();
                tokio::spawn(async move {
                    let response = handler(envelope.request.clone()).await;
                    envelope.reply(response);
                });
            }
            debug!("inbox {} closed", self.target);
        })
    }
}

#[derive(Default)]
pub struct LocalBus {
    routes: RwLock<HashMap<Target, mpsc::UnboundedSender<Envelope>>>,
}

impl LocalBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `target`, replacing any previous registration.
    pub fn register(&self, target: Target) -> Inbox {
        let (tx, rx) = mpsc::unbounded_channel();
        if self.routes.write().insert(target, tx).is_some() {
            warn!("replaced existing responder for {}", target);
        }
        Inbox { target, rx }
    }

    pub fn unregister(&self, target: Target) -> bool {
        self.routes.write().remove(&target).is_some()
    }
}

impl Transport for LocalBus {
    fn dispatch(&self, target: Target, request: Request, ack: Ack) {
        let sender = self.routes.read().get(&target).cloned();
        let Some(sender) = sender else {
            ack.fail(NO_RECEIVER);
            return;
        };
        if let Err(mpsc::error::SendError(envelope)) = sender.send(Envelope {
            target,
            request,
            ack,
        }) {
            envelope.ack.fail(NO_RECEIVER);
        }
    }
}
