//! The queue, id allocator and current slot owned by one bot session.

use std::sync::Arc;

use acnh_orders_core::id::SequentialIdAllocator;

use crate::config::OrderConfig;
use crate::domain::eta::EtaEstimator;
use crate::domain::order::Order;
use crate::domain::queue::{CurrentOrderSlot, OrderQueue};

/// Everything a handler needs to work on the queue. Created once at startup
/// and passed to handlers by reference.
#[derive(Debug)]
pub struct OrderHub {
    ids: SequentialIdAllocator,
    queue: OrderQueue,
    current: CurrentOrderSlot,
    eta: EtaEstimator,
    config: OrderConfig,
}

impl OrderHub {
    /// Creates an empty hub for `config`.
    #[must_use]
    pub fn new(config: OrderConfig) -> Self {
        let queue = match config.skip_cooldown() {
            Some(cooldown) => OrderQueue::new().with_skip_cooldown(cooldown),
            None => OrderQueue::new(),
        };
        Self {
            ids: SequentialIdAllocator::new(),
            queue,
            current: CurrentOrderSlot::new(),
            eta: config.eta_estimator(),
            config,
        }
    }

    /// The id allocator.
    #[must_use]
    pub fn ids(&self) -> &SequentialIdAllocator {
        &self.ids
    }

    /// The pending orders.
    #[must_use]
    pub fn queue(&self) -> &OrderQueue {
        &self.queue
    }

    /// The order being served.
    #[must_use]
    pub fn current(&self) -> &CurrentOrderSlot {
        &self.current
    }

    /// The wait-time estimator.
    #[must_use]
    pub fn eta(&self) -> &EtaEstimator {
        &self.eta
    }

    /// The settings this hub was built from.
    #[must_use]
    pub fn config(&self) -> &OrderConfig {
        &self.config
    }

    /// Hands the worker the order to serve. If an order is already in
    /// flight and still queued, that one is returned again; otherwise the
    /// head of the active view is claimed into the current slot.
    #[must_use]
    pub fn claim_next(&self) -> Option<Arc<Order>> {
        if let Some(in_flight) = self
            .current
            .get()
            .and_then(|current| self.queue.find(current.order_id))
        {
            return Some(in_flight);
        }
        let next = self.queue.peek()?;
        self.current.set(&next);
        Some(next)
    }

    /// Frees the slot held by `order` and drops it from the queue. Called
    /// from the on-finish hook.
    pub fn complete(&self, order: &Order) {
        self.queue.remove(order.id());
        self.current.release_if(order.id());
    }
}

impl Default for OrderHub {
    fn default() -> Self {
        Self::new(OrderConfig::default())
    }
}
