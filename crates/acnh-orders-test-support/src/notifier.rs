//! Test notifiers — mock `OrderNotifier` implementations for tests.

use std::sync::Mutex;

use acnh_orders_core::error::NotifyError;
use acnh_orders_core::id::OrderId;
use acnh_orders_queue::domain::notifier::{CancelAudience, OrderNotifier};
use acnh_orders_queue::domain::order::Order;

/// One call received by a `RecordingNotifier`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// `order_initializing` was called.
    Initializing {
        /// The order.
        order_id: OrderId,
        /// The message passed along.
        message: String,
    },
    /// `order_ready` was called.
    Ready {
        /// The order.
        order_id: OrderId,
        /// The message passed along.
        message: String,
        /// The dodo code passed along.
        connection_code: String,
    },
    /// `order_finished` was called.
    Finished {
        /// The order.
        order_id: OrderId,
        /// The message passed along.
        message: String,
    },
    /// `order_cancelled` was called.
    Cancelled {
        /// The order.
        order_id: OrderId,
        /// The message passed along.
        message: String,
        /// Who was meant to hear about it.
        audience: CancelAudience,
    },
    /// `notification` was called.
    Message {
        /// The order.
        order_id: OrderId,
        /// The message passed along.
        message: String,
    },
}

/// A notifier that records every call and always succeeds.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    calls: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    /// Create an empty recording notifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all calls in the order they arrived.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn calls(&self) -> Vec<Notification> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Notification) -> Result<(), NotifyError> {
        self.calls.lock().unwrap().push(call);
        Ok(())
    }
}

impl OrderNotifier for RecordingNotifier {
    fn order_initializing(&self, order: &Order, message: &str) -> Result<(), NotifyError> {
        self.record(Notification::Initializing {
            order_id: order.id(),
            message: message.to_owned(),
        })
    }

    fn order_ready(
        &self,
        order: &Order,
        message: &str,
        connection_code: &str,
    ) -> Result<(), NotifyError> {
        self.record(Notification::Ready {
            order_id: order.id(),
            message: message.to_owned(),
            connection_code: connection_code.to_owned(),
        })
    }

    fn order_finished(&self, order: &Order, message: &str) -> Result<(), NotifyError> {
        self.record(Notification::Finished {
            order_id: order.id(),
            message: message.to_owned(),
        })
    }

    fn order_cancelled(
        &self,
        order: &Order,
        message: &str,
        audience: CancelAudience,
    ) -> Result<(), NotifyError> {
        self.record(Notification::Cancelled {
            order_id: order.id(),
            message: message.to_owned(),
            audience,
        })
    }

    fn notification(&self, order: &Order, message: &str) -> Result<(), NotifyError> {
        self.record(Notification::Message {
            order_id: order.id(),
            message: message.to_owned(),
        })
    }
}

/// A notifier whose requester never accepts direct messages. Useful for
/// checking that delivery failures leave transitions in place.
#[derive(Debug)]
pub struct FailingNotifier;

impl FailingNotifier {
    fn unreachable(order: &Order) -> Result<(), NotifyError> {
        Err(NotifyError::Unreachable {
            user_id: order.user_id(),
            reason: "direct messages disabled".into(),
        })
    }
}

impl OrderNotifier for FailingNotifier {
    fn order_initializing(&self, order: &Order, _message: &str) -> Result<(), NotifyError> {
        Self::unreachable(order)
    }

    fn order_ready(
        &self,
        order: &Order,
        _message: &str,
        _connection_code: &str,
    ) -> Result<(), NotifyError> {
        Self::unreachable(order)
    }

    fn order_finished(&self, order: &Order, _message: &str) -> Result<(), NotifyError> {
        Self::unreachable(order)
    }

    fn order_cancelled(
        &self,
        order: &Order,
        _message: &str,
        _audience: CancelAudience,
    ) -> Result<(), NotifyError> {
        Self::unreachable(order)
    }

    fn notification(&self, order: &Order, _message: &str) -> Result<(), NotifyError> {
        Self::unreachable(order)
    }
}
