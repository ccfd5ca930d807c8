//! Health check endpoint.

use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::state::AppState;

pub fn router<P: Clone + Send + Sync + 'static>() -> Router<AppState<P>> {
    Router::new().route("/health", get(health_check))
}

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "dealflow-notifier",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
