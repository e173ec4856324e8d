mod bars;
mod events;

use std::sync::Arc;

use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::state::AppState;

pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/stock-data", get(bars::stock_data))
        .route("/stock-events", get(events::stock_events))
        .route("/health", get(health))
}

/// Liveness probe; succeeds unconditionally and bypasses the rate gates.
async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}
