//! Configuration routes.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::state::AppState;
use promptsync_core::{Config, ConfigProvider};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/config", get(get_config).put(save_config))
}

async fn get_config(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Config>, (StatusCode, Json<serde_json::Value>)> {
    state
        .config
        .load()
        .map(Json)
        .map_err(|e| internal_error(e.to_string()))
}

async fn save_config(
    State(state): State<Arc<AppState>>,
    Json(config): Json<Config>,
) -> Result<Json<Config>, (StatusCode, Json<serde_json::Value>)> {
    state
        .config
        .save(config)
        .map(Json)
        .map_err(|e| internal_error(e.to_string()))
}

pub(crate) fn internal_error(message: String) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": message })),
    )
}
