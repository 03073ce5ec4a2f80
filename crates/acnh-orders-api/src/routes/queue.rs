//! Routes used by requesters and moderators.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use acnh_orders_core::error::DomainError;
use acnh_orders_core::id::OrderId;
use acnh_orders_queue::application::command_handlers;
use acnh_orders_queue::application::query_handlers::{self, PositionView, QueueListingView};
use acnh_orders_queue::domain::commands;
use acnh_orders_queue::domain::order::{OrderPayload, Requester};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for `POST /`.
#[derive(Debug, Deserialize)]
pub struct EnqueueRequest {
    /// Chat identity of the requester.
    pub user_id: u64,
    /// Name shown in listings.
    pub display_name: String,
    /// Requested item codes.
    #[serde(default)]
    pub items: Vec<String>,
    /// Requested villager.
    #[serde(default)]
    pub companion: Option<String>,
}

/// Response body for `POST /`, whether the order was admitted or not.
#[derive(Debug, Serialize)]
pub struct EnqueueResponse {
    /// Whether the order was admitted.
    pub success: bool,
    /// 1-based position, when admitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
    /// Formatted wait estimate, when admitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eta_text: Option<String>,
    /// The new order's id, when admitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<OrderId>,
    /// Text for the requester.
    pub message: String,
    /// Why the order was refused.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<&'static str>,
    /// Villager echoed back on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub companion: Option<String>,
}

/// Response body for `DELETE /`.
#[derive(Debug, Serialize)]
pub struct ClearResponse {
    /// How many entries were dropped.
    pub dropped: usize,
}

/// `POST /`
#[instrument(skip(state, request), fields(user_id = request.user_id))]
async fn enqueue_order(
    State(state): State<AppState>,
    Json(request): Json<EnqueueRequest>,
) -> Result<(StatusCode, Json<EnqueueResponse>), ApiError> {
    if request.display_name.trim().is_empty() {
        let error = DomainError::Validation("display_name must not be empty".into());
        return Err(error.into());
    }

    let command = commands::EnqueueOrder {
        correlation_id: Uuid::new_v4(),
        requester: Requester::new(request.user_id, request.display_name),
        payload: OrderPayload {
            items: request.items,
            companion: request.companion,
        },
    };

    info!(correlation_id = %command.correlation_id, "handling enqueue_order command");

    let (status, response) = match command_handlers::handle_enqueue_order(
        &command,
        &state.hub,
        state.clock.as_ref(),
        None,
    ) {
        Ok(receipt) => (
            StatusCode::OK,
            EnqueueResponse {
                success: true,
                position: Some(receipt.position),
                eta_text: Some(receipt.eta_text),
                order_id: Some(receipt.order_id),
                message: receipt.message,
                error_kind: None,
                companion: receipt.companion,
            },
        ),
        Err(rejection) => (
            StatusCode::CONFLICT,
            EnqueueResponse {
                success: false,
                position: None,
                eta_text: None,
                order_id: None,
                message: rejection.message,
                error_kind: Some(rejection.error.kind()),
                companion: None,
            },
        ),
    };

    Ok((status, Json(response)))
}

/// `GET /`
async fn list_queue(State(state): State<AppState>) -> Json<QueueListingView> {
    Json(query_handlers::get_queue_listing(&state.hub))
}

/// `DELETE /`
#[instrument(skip(state))]
async fn clear_queue(State(state): State<AppState>) -> Json<ClearResponse> {
    let command = commands::ClearQueue {
        correlation_id: Uuid::new_v4(),
    };
    let dropped = command_handlers::handle_clear_queue(&command, &state.hub);
    Json(ClearResponse { dropped })
}

/// `GET /{user_id}`
#[instrument(skip(state))]
async fn get_position(
    State(state): State<AppState>,
    Path(user_id): Path<u64>,
) -> Result<Json<PositionView>, ApiError> {
    let view = query_handlers::get_position(user_id, &state.hub)?;
    Ok(Json(view))
}

/// `POST /{user_id}/skip`
#[instrument(skip(state))]
async fn skip_order(
    State(state): State<AppState>,
    Path(user_id): Path<u64>,
) -> Result<StatusCode, ApiError> {
    let command = commands::SkipOrder {
        correlation_id: Uuid::new_v4(),
        user_id,
    };

    info!(correlation_id = %command.correlation_id, "handling skip_order command");

    command_handlers::handle_skip_order(&command, &state.hub, state.clock.as_ref())?;
    Ok(StatusCode::NO_CONTENT)
}

/// Returns the router for the queue.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(enqueue_order).get(list_queue).delete(clear_queue))
        .route("/{user_id}", get(get_position))
        .route("/{user_id}/skip", post(skip_order))
}
