//! Wait estimate for an arbitrary position.

use axum::extract::{Path, State};
use axum::{Json, Router, routing::get};
use tracing::instrument;

use acnh_orders_queue::application::query_handlers::{self, EtaView};

use crate::error::ApiError;
use crate::state::AppState;

/// `GET /{position}`
#[instrument(skip(state))]
async fn get_eta(
    State(state): State<AppState>,
    Path(position): Path<usize>,
) -> Result<Json<EtaView>, ApiError> {
    let view = query_handlers::get_eta(position, &state.hub)?;
    Ok(Json(view))
}

/// Returns the router for wait estimates.
pub fn router() -> Router<AppState> {
    Router::new().route("/{position}", get(get_eta))
}
