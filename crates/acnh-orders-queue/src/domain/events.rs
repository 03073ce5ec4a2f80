//! Lifecycle events recorded on an order.

use acnh_orders_core::event::{DomainEvent, EventMetadata};
use acnh_orders_core::id::OrderId;
use serde::{Deserialize, Serialize};

/// Emitted when the worker starts preparing the session for the requester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderInitializing {
    /// The order identifier.
    pub order_id: OrderId,
    /// Message passed by the worker.
    pub message: String,
}

/// Emitted when the session is open and the connection code was handed out.
///
/// The code itself is only given to the notifier and never recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderReady {
    /// The order identifier.
    pub order_id: OrderId,
    /// Message passed by the worker.
    pub message: String,
}

/// Emitted when the order was fulfilled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFinished {
    /// The order identifier.
    pub order_id: OrderId,
    /// Message passed by the worker.
    pub message: String,
}

/// Emitted when the order was aborted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCancelled {
    /// The order identifier.
    pub order_id: OrderId,
    /// Message passed by the worker.
    pub message: String,
    /// `true` for internal faults, which are reported to the requester only.
    pub faulted: bool,
}

/// Emitted for an out-of-band message that does not change state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSent {
    /// The order identifier.
    pub order_id: OrderId,
    /// The message sent.
    pub message: String,
}

/// Event type identifier for [`OrderInitializing`].
pub const ORDER_INITIALIZING_EVENT_TYPE: &str = "order.initializing";

/// Event type identifier for [`OrderReady`].
pub const ORDER_READY_EVENT_TYPE: &str = "order.ready";

/// Event type identifier for [`OrderFinished`].
pub const ORDER_FINISHED_EVENT_TYPE: &str = "order.finished";

/// Event type identifier for [`OrderCancelled`].
pub const ORDER_CANCELLED_EVENT_TYPE: &str = "order.cancelled";

/// Event type identifier for [`NotificationSent`].
pub const NOTIFICATION_SENT_EVENT_TYPE: &str = "order.notification_sent";

/// Event payload variants for an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderEventKind {
    /// Fulfillment has begun.
    Initializing(OrderInitializing),
    /// The connection code was delivered.
    Ready(OrderReady),
    /// Fulfillment completed.
    Finished(OrderFinished),
    /// Fulfillment aborted.
    Cancelled(OrderCancelled),
    /// A freeform message was sent.
    NotificationSent(NotificationSent),
}

impl OrderEventKind {
    /// Returns the event type name for this payload.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Initializing(_) => ORDER_INITIALIZING_EVENT_TYPE,
            Self::Ready(_) => ORDER_READY_EVENT_TYPE,
            Self::Finished(_) => ORDER_FINISHED_EVENT_TYPE,
            Self::Cancelled(_) => ORDER_CANCELLED_EVENT_TYPE,
            Self::NotificationSent(_) => NOTIFICATION_SENT_EVENT_TYPE,
        }
    }
}

/// Domain event envelope for an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: OrderEventKind,
}

impl DomainEvent for OrderEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).expect("OrderEventKind serialization is infallible")
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
