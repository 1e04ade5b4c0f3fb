//! On-demand sync and cached history listing.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};

use super::config::internal_error;
use crate::state::AppState;
use promptsync_core::{ConversationRecord, SyncResult};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sync", post(sync_all))
        .route("/histories", get(list_histories))
}

async fn sync_all(State(state): State<Arc<AppState>>) -> Json<SyncResult> {
    Json(state.engine.sync_all().await)
}

async fn list_histories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ConversationRecord>>, (StatusCode, Json<serde_json::Value>)> {
    state
        .cache
        .histories()
        .map(Json)
        .map_err(|e| internal_error(e.to_string()))
}
