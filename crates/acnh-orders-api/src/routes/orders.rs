//! Routes for inspecting and advancing a single order.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use acnh_orders_core::id::OrderId;
use acnh_orders_queue::application::command_handlers;
use acnh_orders_queue::application::query_handlers::{self, OrderView};
use acnh_orders_queue::domain::commands::{self, LifecycleStep};
use acnh_orders_queue::domain::order::OrderState;

use crate::error::ApiError;
use crate::state::AppState;

/// Response body for `POST /{order_id}/advance`.
#[derive(Debug, Serialize)]
pub struct AdvanceResponse {
    /// The order that was advanced.
    pub order_id: OrderId,
    /// Its state afterwards.
    pub state: OrderState,
}

/// `GET /{order_id}`
#[instrument(skip(state))]
async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<u64>,
) -> Result<Json<OrderView>, ApiError> {
    let view = query_handlers::get_order(OrderId(order_id), &state.hub)?;
    Ok(Json(view))
}

/// `POST /{order_id}/advance`
#[instrument(skip(state, step))]
async fn advance_order(
    State(state): State<AppState>,
    Path(order_id): Path<u64>,
    Json(step): Json<LifecycleStep>,
) -> Result<Json<AdvanceResponse>, ApiError> {
    let command = commands::AdvanceOrder {
        correlation_id: Uuid::new_v4(),
        order_id: OrderId(order_id),
        step,
    };

    info!(correlation_id = %command.correlation_id, "handling advance_order command");

    let new_state = command_handlers::handle_advance_order(
        &command,
        &state.hub,
        state.notifier.as_ref(),
        state.clock.as_ref(),
    )?;

    Ok(Json(AdvanceResponse {
        order_id: command.order_id,
        state: new_state,
    }))
}

/// Returns the router for individual orders.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{order_id}", get(get_order))
        .route("/{order_id}/advance", post(advance_order))
}
