//! Message bridge: forwards action envelopes over the channel.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::warn;

use crate::state::AppState;
use promptsync_protocol::{Request, Response, Target};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/messages", post(send_message))
}

#[derive(Debug, Deserialize)]
struct MessageQuery {
    /// Deliver to a page context instead of the background.
    tab: Option<u32>,
    /// `0` disables the deadline.
    #[serde(rename = "timeoutMs")]
    timeout_ms: Option<u64>,
}

async fn send_message(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MessageQuery>,
    Json(payload): Json<serde_json::Value>,
) -> Json<Response> {
    let request = match Request::parse(payload) {
        Ok(request) => request,
        Err(message) => return Json(Response::failure(message)),
    };

    let target = query.tab.map(Target::Tab).unwrap_or(Target::Background);
    let timeout = query.timeout_ms.map(Duration::from_millis);

    match state.channel.send(target, request, timeout).await {
        Ok(response) => Json(response),
        Err(e) => {
            warn!("Message to {} failed: {}", target, e);
            Json(Response::from_error(&e))
        }
    }
}
