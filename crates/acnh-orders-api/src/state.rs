//! Shared application state.

use std::sync::Arc;

use acnh_orders_core::clock::Clock;
use acnh_orders_queue::domain::notifier::OrderNotifier;
use acnh_orders_queue::hub::OrderHub;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Queue, current slot and id allocator.
    pub hub: Arc<OrderHub>,
    /// Clock for timestamps and cooldowns.
    pub clock: Arc<dyn Clock>,
    /// Messaging collaborator told about lifecycle transitions.
    pub notifier: Arc<dyn OrderNotifier>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        hub: Arc<OrderHub>,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn OrderNotifier>,
    ) -> Self {
        Self {
            hub,
            clock,
            notifier,
        }
    }
}
