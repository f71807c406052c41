//! HTTP routes for the Control Center

use std::sync::Arc;

use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use shared_types::SAVE_CONFIG_PATH;

pub mod page;
pub mod save;

use crate::AppState;

/// Configure all API routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(page::index_page))
        .route("/health", get(health_check))
        .route(SAVE_CONFIG_PATH, post(save::save_config))
}

async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
