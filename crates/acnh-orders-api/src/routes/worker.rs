//! Routes used by the fulfillment worker.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tracing::{info, instrument};

use acnh_orders_core::id::OrderId;
use acnh_orders_queue::application::query_handlers;

use crate::error::ApiError;
use crate::state::AppState;

/// Response body for `DELETE /current`.
#[derive(Debug, Serialize)]
pub struct ReleaseResponse {
    /// The order that held the slot, if any.
    pub released: Option<OrderId>,
}

/// `POST /claim`
///
/// Returns the order to serve, or 204 when the active view is empty.
#[instrument(skip(state))]
async fn claim_next(State(state): State<AppState>) -> Result<Response, ApiError> {
    let Some(order) = state.hub.claim_next() else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };
    info!(order_id = %order.id(), "order claimed");
    let view = query_handlers::get_order(order.id(), &state.hub)?;
    Ok(Json(view).into_response())
}

/// `GET /current`
async fn current_order(State(state): State<AppState>) -> Response {
    match query_handlers::get_current_order(&state.hub) {
        Some(view) => Json(view).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

/// `DELETE /current`
#[instrument(skip(state))]
async fn release_current(State(state): State<AppState>) -> Json<ReleaseResponse> {
    let released = state.hub.current().release().map(|current| current.order_id);
    info!(?released, "current slot released");
    Json(ReleaseResponse { released })
}

/// Returns the router for the worker.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/claim", post(claim_next))
        .route("/current", get(current_order).delete(release_current))
}
