//! Query handlers for the order queue.
//!
//! Read-only views over a snapshot of the queue. Positions and estimates are
//! advisory; they may be stale by the time the caller renders them.

use acnh_orders_core::error::DomainError;
use acnh_orders_core::id::OrderId;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::eta::format_eta;
use crate::domain::events::OrderEvent;
use crate::domain::order::{Order, OrderState};
use crate::domain::queue::OrderQueue;
use crate::hub::OrderHub;

/// Where a requester stands in the queue.
#[derive(Debug, Serialize)]
pub struct PositionView {
    /// The requester.
    pub user_id: u64,
    /// Their order.
    pub order_id: OrderId,
    /// Their display name.
    pub display_name: String,
    /// 1-based position in the active view.
    pub position: usize,
    /// Current lifecycle state.
    pub state: OrderState,
    /// Estimated wait at this position.
    pub eta_text: String,
}

/// The active view as shown to users.
#[derive(Debug, Serialize)]
pub struct QueueListingView {
    /// Display names in arrival order.
    pub names: Vec<String>,
    /// The same names, one per line.
    pub text: String,
}

/// A wait estimate for a position.
#[derive(Debug, Serialize)]
pub struct EtaView {
    /// The position asked about.
    pub position: usize,
    /// Estimated wait in seconds.
    pub eta_seconds: u64,
    /// Estimated wait, formatted.
    pub eta_text: String,
}

/// Full read-only view of one order.
///
/// The connection code is never part of this view.
#[derive(Debug, Serialize)]
pub struct OrderView {
    /// The order identifier.
    pub order_id: OrderId,
    /// The requester.
    pub user_id: u64,
    /// The requester's display name.
    pub display_name: String,
    /// Current lifecycle state.
    pub state: OrderState,
    /// Whether a moderator skipped this order.
    pub skip_requested: bool,
    /// 1-based active position, absent for skipped orders.
    pub position: Option<usize>,
    /// Requested item codes.
    pub items: Vec<String>,
    /// Requested villager.
    pub companion: Option<String>,
    /// When the order was queued.
    pub created_at: DateTime<Utc>,
    /// Lifecycle events so far.
    pub history: Vec<OrderEvent>,
}

fn order_view(order: &Order, hub: &OrderHub) -> OrderView {
    OrderView {
        order_id: order.id(),
        user_id: order.user_id(),
        display_name: order.display_name().to_owned(),
        state: order.state(),
        skip_requested: order.is_skip_requested(),
        position: hub.queue().position_of_order(order.id()),
        items: order.payload().items.clone(),
        companion: order.payload().companion.clone(),
        created_at: order.created_at(),
        history: order.history(),
    }
}

/// Looks up where `user_id` stands.
///
/// # Errors
///
/// Returns `DomainError::RequesterNotFound` if the requester has no active
/// order. Skipped orders count as absent.
pub fn get_position(user_id: u64, hub: &OrderHub) -> Result<PositionView, DomainError> {
    let (position, order) = hub
        .queue()
        .position_of(user_id)
        .ok_or(DomainError::RequesterNotFound(user_id))?;
    Ok(PositionView {
        user_id,
        order_id: order.id(),
        display_name: order.display_name().to_owned(),
        position,
        state: order.state(),
        eta_text: hub.eta().estimate_text(position),
    })
}

/// Lists the active view. An empty queue gives an empty listing.
#[must_use]
pub fn get_queue_listing(hub: &OrderHub) -> QueueListingView {
    let names = hub.queue().list_active();
    let text = OrderQueue::listing_text(&names);
    QueueListingView { names, text }
}

/// Estimates the wait for `position`.
///
/// # Errors
///
/// Returns `DomainError::Validation` if `position` is 0.
pub fn get_eta(position: usize, hub: &OrderHub) -> Result<EtaView, DomainError> {
    if position == 0 {
        return Err(DomainError::Validation("position must be at least 1".to_owned()));
    }
    let eta = hub.eta().estimate(position);
    Ok(EtaView {
        position,
        eta_seconds: eta.as_secs(),
        eta_text: format_eta(eta),
    })
}

/// Retrieves an order by id, skipped or not.
///
/// # Errors
///
/// Returns `DomainError::OrderNotFound` if the order is not queued.
pub fn get_order(order_id: OrderId, hub: &OrderHub) -> Result<OrderView, DomainError> {
    let order = hub
        .queue()
        .find(order_id)
        .ok_or(DomainError::OrderNotFound(order_id))?;
    Ok(order_view(&order, hub))
}

/// The order the worker is serving, if it is still queued.
#[must_use]
pub fn get_current_order(hub: &OrderHub) -> Option<OrderView> {
    let current = hub.current().get()?;
    let order = hub.queue().find(current.order_id)?;
    Some(order_view(&order, hub))
}
