//! HTTP surface for the tickrelay market-data proxy.
//!
//! Exposes three routes to a browser client: `/stock-data` (daily OHLCV
//! bars), `/stock-events` (dividends and splits) and `/health`. All
//! upstream access goes through the cache-fronted service in
//! `tickrelay-core`; the upstream API key never leaves the server.

pub mod config;
pub mod error;
pub mod rate_limit;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;

use crate::state::AppState;

/// Build the application router with permissive CORS for the browser
/// client.
pub fn app(state: Arc<AppState>) -> Router {
    routes::api_router()
        .layer(CorsLayer::permissive())
        .with_state(state)
}
