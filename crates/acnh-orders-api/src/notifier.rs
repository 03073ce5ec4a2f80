//! Notifier that reports lifecycle transitions through `tracing`.

use acnh_orders_core::error::NotifyError;
use acnh_orders_queue::domain::notifier::{CancelAudience, OrderNotifier};
use acnh_orders_queue::domain::order::Order;
use tracing::info;

/// Writes one structured log line per notification. Stands in for a chat
/// integration when the server runs on its own.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl OrderNotifier for LogNotifier {
    fn order_initializing(&self, order: &Order, message: &str) -> Result<(), NotifyError> {
        info!(order_id = %order.id(), user_id = order.user_id(), message, "initializing order");
        Ok(())
    }

    fn order_ready(
        &self,
        order: &Order,
        message: &str,
        _connection_code: &str,
    ) -> Result<(), NotifyError> {
        // The code is only for the requester.
        info!(order_id = %order.id(), user_id = order.user_id(), message, "order ready");
        Ok(())
    }

    fn order_finished(&self, order: &Order, message: &str) -> Result<(), NotifyError> {
        info!(order_id = %order.id(), user_id = order.user_id(), message, "order finished");
        Ok(())
    }

    fn order_cancelled(
        &self,
        order: &Order,
        message: &str,
        audience: CancelAudience,
    ) -> Result<(), NotifyError> {
        info!(
            order_id = %order.id(),
            user_id = order.user_id(),
            message,
            ?audience,
            "order cancelled"
        );
        Ok(())
    }

    fn notification(&self, order: &Order, message: &str) -> Result<(), NotifyError> {
        info!(order_id = %order.id(), user_id = order.user_id(), message, "order notification");
        Ok(())
    }
}
