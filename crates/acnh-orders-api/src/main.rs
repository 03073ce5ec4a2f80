//! ACNH Orders API server entry point.

use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;

use acnh_orders_api::config::{ServerConfig, load_order_config};
use acnh_orders_api::notifier::LogNotifier;
use acnh_orders_api::routes;
use acnh_orders_api::state::AppState;
use acnh_orders_core::clock::SystemClock;
use acnh_orders_queue::hub::OrderHub;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting ACNH Orders API server");

    // Read configuration from environment.
    let server = ServerConfig::from_env()?;
    let order_config = load_order_config()?;
    tracing::info!(
        show_ids = order_config.show_ids,
        skip_cooldown_seconds = ?order_config.skip_cooldown_seconds,
        "queue settings ready"
    );

    // Build application state.
    let app_state = AppState::new(
        Arc::new(OrderHub::new(order_config)),
        Arc::new(SystemClock),
        Arc::new(LogNotifier),
    );

    // Build router.
    let app = Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/queue", routes::queue::router())
        .nest("/api/v1/eta", routes::eta::router())
        .nest("/api/v1/orders", routes::orders::router())
        .nest("/api/v1/worker", routes::worker::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server.
    let addr: SocketAddr = format!("{}:{}", server.host, server.port)
        .parse()
        .map_err(|e| format!("invalid HOST:PORT combination: {e}"))?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
