//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use acnh_orders_api::notifier::LogNotifier;
use acnh_orders_api::routes;
use acnh_orders_api::state::AppState;
use acnh_orders_core::clock::Clock;
use acnh_orders_queue::config::OrderConfig;
use acnh_orders_queue::hub::OrderHub;
use acnh_orders_test_support::FixedClock;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

/// Fixed timestamp used across all integration tests.
fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock(
        chrono::TimeZone::with_ymd_and_hms(&chrono::Utc, 2026, 1, 15, 10, 0, 0).unwrap(),
    ))
}

/// Build the full app router with default queue settings. Uses the same
/// route structure as `main.rs`.
pub fn build_test_app() -> Router {
    build_test_app_with(OrderConfig::default())
}

/// Build the full app router with custom queue settings.
pub fn build_test_app_with(config: OrderConfig) -> Router {
    let app_state = AppState::new(
        Arc::new(OrderHub::new(config)),
        fixed_clock(),
        Arc::new(LogNotifier),
    );

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/queue", routes::queue::router())
        .nest("/api/v1/eta", routes::eta::router())
        .nest("/api/v1/orders", routes::orders::router())
        .nest("/api/v1/worker", routes::worker::router())
        .with_state(app_state)
}

/// Send a request with an optional JSON body and return the response.
/// An empty response body comes back as `Value::Null`.
pub async fn send(
    app: Router,
    method: &str,
    uri: &str,
    body: Option<&serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body_bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };

    (status, json)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send(app, "POST", uri, Some(body)).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    send(app, "GET", uri, None).await
}

/// Enqueue `display_name` as `user_id` and return the response.
pub async fn enqueue(
    app: Router,
    user_id: u64,
    display_name: &str,
) -> (StatusCode, serde_json::Value) {
    post_json(
        app,
        "/api/v1/queue",
        &serde_json::json!({
            "user_id": user_id,
            "display_name": display_name,
            "items": ["0x1A2B"]
        }),
    )
    .await
}
