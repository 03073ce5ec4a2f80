//! Commands for the order queue.

use acnh_orders_core::id::OrderId;
use serde::Deserialize;
use uuid::Uuid;

use super::order::{OrderPayload, Requester};

/// Command to place an order in the queue.
#[derive(Debug, Clone)]
pub struct EnqueueOrder {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Who the order is for.
    pub requester: Requester,
    /// What was ordered.
    pub payload: OrderPayload,
}

/// Moderator command to skip a requester's entry.
#[derive(Debug, Clone)]
pub struct SkipOrder {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The requester to skip.
    pub user_id: u64,
}

/// Administrative command to drop every entry.
#[derive(Debug, Clone)]
pub struct ClearQueue {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
}

/// A lifecycle step requested by the fulfillment worker.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum LifecycleStep {
    /// Start preparing the session.
    Initializing {
        /// Message for the requester.
        #[serde(default)]
        message: String,
    },
    /// Session open; deliver the code.
    Ready {
        /// Message for the requester.
        #[serde(default)]
        message: String,
        /// One-time dodo code.
        connection_code: String,
    },
    /// Fulfilled.
    Finished {
        /// Message for the requester.
        #[serde(default)]
        message: String,
    },
    /// Aborted.
    Cancelled {
        /// Message for the requester.
        #[serde(default)]
        message: String,
        /// Internal fault rather than a user-visible cancellation.
        #[serde(default)]
        faulted: bool,
    },
    /// Freeform message, no state change.
    Notify {
        /// Message for the requester.
        message: String,
    },
}

/// Command to move an order through its lifecycle.
#[derive(Debug, Clone)]
pub struct AdvanceOrder {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The order to advance.
    pub order_id: OrderId,
    /// The step to apply.
    pub step: LifecycleStep,
}
