//! Health check endpoint.

use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::state::AppState;

pub fn router<Q: Clone + Send + Sync + 'static>() -> Router<AppState<Q>> {
    Router::new().route("/health", get(health_check))
}

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "dealflow-receiver",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
