//! Observer interface implemented by the messaging collaborator.

use acnh_orders_core::error::NotifyError;

use super::order::Order;

/// Who should hear about a cancelled order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelAudience {
    /// Internal fault: tell the requester privately, nobody else.
    RequesterOnly,
    /// User-visible cancellation: tell the requester and the channel the
    /// order was placed from.
    RequesterAndChannel,
}

impl CancelAudience {
    /// Maps the worker's `faulted` flag to an audience.
    #[must_use]
    pub fn from_faulted(faulted: bool) -> Self {
        if faulted {
            Self::RequesterOnly
        } else {
            Self::RequesterAndChannel
        }
    }
}

/// Receives one call per lifecycle transition of an order.
///
/// Implementations deliver messages to the requester. A returned error is
/// logged by the caller and never undoes the transition.
pub trait OrderNotifier: Send + Sync {
    /// The worker began preparing the session for this requester.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError` if the message could not be delivered.
    fn order_initializing(&self, order: &Order, message: &str) -> Result<(), NotifyError>;

    /// The session is open; `connection_code` is the one-time dodo code.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError` if the message could not be delivered.
    fn order_ready(
        &self,
        order: &Order,
        message: &str,
        connection_code: &str,
    ) -> Result<(), NotifyError>;

    /// The order completed.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError` if the message could not be delivered.
    fn order_finished(&self, order: &Order, message: &str) -> Result<(), NotifyError>;

    /// The order was aborted.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError` if the message could not be delivered.
    fn order_cancelled(
        &self,
        order: &Order,
        message: &str,
        audience: CancelAudience,
    ) -> Result<(), NotifyError>;

    /// Freeform message with no state change.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError` if the message could not be delivered.
    fn notification(&self, order: &Order, message: &str) -> Result<(), NotifyError>;
}
