use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use tickrelay_core::{
    Clock, FmpAdapter, MarketDataService, ReqwestHttpClient, SystemClock,
};
use tickrelay_web::config::ServerConfig;
use tickrelay_web::rate_limit::RequestGates;
use tickrelay_web::state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(error) => {
            tracing::error!("invalid configuration: {error}");
            std::process::exit(1);
        }
    };

    let http_client = Arc::new(ReqwestHttpClient::new());
    let adapter = Arc::new(FmpAdapter::with_http_client(
        http_client,
        config.api_key.clone(),
    ));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let service = MarketDataService::new(adapter, config.cache_policy(), Arc::clone(&clock));
    let gates = RequestGates::new(
        config.rate_per_day,
        config.rate_per_hour,
        config.bars_rate_per_minute,
    );

    let state = AppState::new(service, gates, clock);
    let app = tickrelay_web::app(state);

    let addr: SocketAddr = format!("{}:{}", config.bind, config.port)
        .parse()
        .expect("invalid bind address");

    tracing::info!("tickrelay listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind listener");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, gracefully stopping…");
}
