//! Command handlers for the order queue.
//!
//! These functions orchestrate the domain: allocate an id, build the order,
//! run the queue checks, and turn the outcome into something the chat layer
//! can show.

use std::sync::{Arc, Weak};
use std::time::Duration;

use acnh_orders_core::clock::Clock;
use acnh_orders_core::error::DomainError;
use acnh_orders_core::id::OrderId;
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::commands::{AdvanceOrder, ClearQueue, EnqueueOrder, LifecycleStep, SkipOrder};
use crate::domain::eta::format_eta;
use crate::domain::notifier::OrderNotifier;
use crate::domain::order::{OnFinish, Order, OrderState};
use crate::domain::queue::EnqueueError;
use crate::hub::OrderHub;

/// Result of a successful enqueue.
#[derive(Debug, Clone)]
pub struct EnqueueReceipt {
    /// The id given to the order.
    pub order_id: OrderId,
    /// 1-based position in the active view.
    pub position: usize,
    /// Estimated wait.
    pub eta: Duration,
    /// Estimated wait, formatted.
    pub eta_text: String,
    /// Confirmation text for the requester.
    pub message: String,
    /// Villager the requester asked for, echoed back.
    pub companion: Option<String>,
}

/// A refused enqueue with the text to show the requester.
#[derive(Debug, Clone, Error)]
#[error("{error}")]
pub struct EnqueueRejection {
    /// Why the order was refused.
    #[source]
    pub error: EnqueueError,
    /// Explanation for the requester.
    pub message: String,
}

/// Handles the `EnqueueOrder` command: allocates an id, attaches the hook
/// that frees the slot once the order ends, and appends the order.
///
/// `on_finish` runs after the hub has been updated.
///
/// # Errors
///
/// Returns `EnqueueRejection` when the queue refuses the requester.
pub fn handle_enqueue_order(
    command: &EnqueueOrder,
    hub: &Arc<OrderHub>,
    clock: &dyn Clock,
    on_finish: Option<OnFinish>,
) -> Result<EnqueueReceipt, EnqueueRejection> {
    let order_id = hub.ids().next();
    let weak: Weak<OrderHub> = Arc::downgrade(hub);
    let order = Order::new(
        order_id,
        command.requester.clone(),
        command.payload.clone(),
        clock,
    )
    .with_on_finish(move |order| {
        if let Some(hub) = weak.upgrade() {
            hub.complete(order);
        }
        if let Some(hook) = on_finish {
            hook(order);
        }
    });

    let name = &command.requester.display_name;
    match hub.queue().enqueue(order, hub.current(), hub.eta(), clock) {
        Ok(enqueued) => {
            info!(
                correlation_id = %command.correlation_id,
                %order_id,
                user_id = command.requester.user_id,
                position = enqueued.position,
                "order queued"
            );
            let eta_text = format_eta(enqueued.eta);
            let id_token = if hub.config().show_ids {
                format!(" (ID {order_id})")
            } else {
                String::new()
            };
            let outlook = if enqueued.position > 1 {
                format!("Your predicted ETA is {eta_text}")
            } else {
                "Your order will start after the current order is complete!".to_owned()
            };
            let message = format!(
                "{name} - Added you to the order queue{id_token}. Your position is: **{}**. {outlook}",
                enqueued.position
            );
            Ok(EnqueueReceipt {
                order_id,
                position: enqueued.position,
                eta: enqueued.eta,
                eta_text,
                message,
                companion: command.payload.companion.clone(),
            })
        }
        Err(error) => {
            info!(
                correlation_id = %command.correlation_id,
                user_id = command.requester.user_id,
                reason = error.kind(),
                "order rejected"
            );
            let message = match &error {
                EnqueueError::AlreadyQueued { .. } => {
                    format!("{name} - Sorry, you are already in the queue.")
                }
                EnqueueError::RecentlyRemoved { .. } => format!(
                    "{name} - You have been recently removed from the queue. Please wait a while before attempting to enter the queue again."
                ),
                EnqueueError::CurrentlyProcessing { .. } => format!(
                    "{name} - Failed to queue your order as it is the current processing order. Please wait a few seconds for the queue to clear if you've already completed it."
                ),
            };
            Err(EnqueueRejection { error, message })
        }
    }
}

/// Handles the `SkipOrder` command: flags the requester's entry so it stops
/// counting toward positions while still blocking re-entry.
///
/// # Errors
///
/// Returns `DomainError::RequesterNotFound` if the requester has no active
/// entry.
pub fn handle_skip_order(
    command: &SkipOrder,
    hub: &OrderHub,
    clock: &dyn Clock,
) -> Result<(), DomainError> {
    if !hub.queue().set_skip(command.user_id, clock) {
        return Err(DomainError::RequesterNotFound(command.user_id));
    }
    info!(correlation_id = %command.correlation_id, user_id = command.user_id, "order skipped");
    Ok(())
}

/// Handles the `ClearQueue` command. Returns how many entries were dropped.
/// No lifecycle notifications are sent.
pub fn handle_clear_queue(command: &ClearQueue, hub: &OrderHub) -> usize {
    let dropped = hub.queue().clear();
    warn!(correlation_id = %command.correlation_id, dropped, "queue cleared");
    dropped
}

/// Handles the `AdvanceOrder` command sent by the fulfillment worker.
/// Returns the order's state afterwards.
///
/// # Errors
///
/// Returns `DomainError::OrderNotFound` if the order is no longer queued and
/// `DomainError::Lifecycle` if the step does not follow the current state.
pub fn handle_advance_order(
    command: &AdvanceOrder,
    hub: &OrderHub,
    notifier: &dyn OrderNotifier,
    clock: &dyn Clock,
) -> Result<OrderState, DomainError> {
    let order = hub
        .queue()
        .find(command.order_id)
        .ok_or(DomainError::OrderNotFound(command.order_id))?;

    match &command.step {
        LifecycleStep::Initializing { message } => {
            order.notify_initializing(message, notifier, clock)?;
        }
        LifecycleStep::Ready {
            message,
            connection_code,
        } => order.notify_ready(message, connection_code, notifier, clock)?,
        LifecycleStep::Finished { message } => order.notify_finished(message, notifier, clock)?,
        LifecycleStep::Cancelled { message, faulted } => {
            order.notify_cancelled(message, *faulted, notifier, clock)?;
        }
        LifecycleStep::Notify { message } => order.send_notification(message, notifier, clock),
    }

    let state = order.state();
    info!(
        correlation_id = %command.correlation_id,
        order_id = %command.order_id,
        ?state,
        "order advanced"
    );
    Ok(state)
}
