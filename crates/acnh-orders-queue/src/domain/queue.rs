//! FIFO order queue with per-requester uniqueness.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Duration;

use acnh_orders_core::clock::Clock;
use acnh_orders_core::id::OrderId;
use chrono::{DateTime, TimeDelta, Utc};
use thiserror::Error;

use super::eta::EtaEstimator;
use super::order::Order;

/// Why an order was not added.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnqueueError {
    /// The requester already has an active entry.
    #[error("user {user_id} is already in the queue")]
    AlreadyQueued {
        /// The requester.
        user_id: u64,
    },

    /// The requester's previous entry was skipped and is still cooling down.
    #[error("user {user_id} was recently removed from the queue")]
    RecentlyRemoved {
        /// The requester.
        user_id: u64,
        /// When the cooldown ends. `None` means only a moderator can lift it.
        retry_after: Option<DateTime<Utc>>,
    },

    /// The requester is the one being served right now.
    #[error("{display_name} is the order currently being processed")]
    CurrentlyProcessing {
        /// The display name that matched the current slot.
        display_name: String,
    },
}

impl EnqueueError {
    /// Machine-readable error code.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AlreadyQueued { .. } => "already_queued",
            Self::RecentlyRemoved { .. } => "recently_removed",
            Self::CurrentlyProcessing { .. } => "currently_processing",
        }
    }
}

/// A successfully queued order.
#[derive(Debug, Clone)]
pub struct Enqueued {
    /// The stored order.
    pub order: Arc<Order>,
    /// 1-based position in the active view.
    pub position: usize,
    /// Estimated wait at that position.
    pub eta: Duration,
}

/// The order the worker is serving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentOrder {
    /// The order being served.
    pub order_id: OrderId,
    /// Its requester's display name.
    pub display_name: String,
}

/// Single-writer slot naming the order in fulfillment.
///
/// Lives outside the queue lock: the worker writes it, enqueue reads it.
#[derive(Debug, Default)]
pub struct CurrentOrderSlot {
    current: RwLock<Option<CurrentOrder>>,
}

impl CurrentOrderSlot {
    /// Creates an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the order being served, if any.
    #[must_use]
    pub fn get(&self) -> Option<CurrentOrder> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Marks `order` as the one being served.
    pub fn set(&self, order: &Order) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(CurrentOrder {
            order_id: order.id(),
            display_name: order.display_name().to_owned(),
        });
    }

    /// Empties the slot and returns what was in it.
    pub fn release(&self) -> Option<CurrentOrder> {
        self.current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// Empties the slot only if it still holds `order_id`.
    pub fn release_if(&self, order_id: OrderId) -> bool {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        if current.as_ref().is_some_and(|c| c.order_id == order_id) {
            *current = None;
            true
        } else {
            false
        }
    }

    /// Returns `true` if `display_name` matches the order being served.
    #[must_use]
    pub fn is_processing(&self, display_name: &str) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|c| c.display_name == display_name)
    }
}

/// Pending orders in arrival order.
///
/// Skip-flagged entries stay in the backing sequence, blocking their
/// requester, but are left out of positions, estimates and listings.
#[derive(Debug, Default)]
pub struct OrderQueue {
    orders: Mutex<VecDeque<Arc<Order>>>,
    skip_cooldown: Option<TimeDelta>,
}

impl OrderQueue {
    /// Creates an empty queue whose skip flags never expire.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lets a skip-flagged requester back in once `cooldown` has passed.
    #[must_use]
    pub fn with_skip_cooldown(mut self, cooldown: TimeDelta) -> Self {
        self.skip_cooldown = Some(cooldown);
        self
    }

    /// Appends `order` unless its requester is already present or being
    /// served. The check and the append happen under one lock.
    ///
    /// # Errors
    ///
    /// Returns `EnqueueError::AlreadyQueued` if the requester has an active
    /// entry, `EnqueueError::RecentlyRemoved` if their entry is skip-flagged,
    /// and `EnqueueError::CurrentlyProcessing` if their display name matches
    /// the current slot.
    pub fn enqueue(
        &self,
        order: Order,
        current: &CurrentOrderSlot,
        eta: &EtaEstimator,
        clock: &dyn Clock,
    ) -> Result<Enqueued, EnqueueError> {
        let user_id = order.user_id();
        let mut orders = self.lock();

        if let Some(index) = orders.iter().position(|o| o.user_id() == user_id) {
            match orders[index].skip_requested_at() {
                None => return Err(EnqueueError::AlreadyQueued { user_id }),
                Some(at) => match self.skip_cooldown {
                    Some(cooldown) if clock.has_elapsed(at, cooldown) => {
                        orders.remove(index);
                    }
                    cooldown => {
                        return Err(EnqueueError::RecentlyRemoved {
                            user_id,
                            retry_after: cooldown.and_then(|c| at.checked_add_signed(c)),
                        });
                    }
                },
            }
        }

        if current.is_processing(order.display_name()) {
            return Err(EnqueueError::CurrentlyProcessing {
                display_name: order.display_name().to_owned(),
            });
        }

        let position = orders.iter().filter(|o| !o.is_skip_requested()).count() + 1;
        let order = Arc::new(order);
        orders.push_back(Arc::clone(&order));

        Ok(Enqueued {
            order,
            position,
            eta: eta.estimate(position),
        })
    }

    /// Returns the 1-based active position and the order of `user_id`.
    #[must_use]
    pub fn position_of(&self, user_id: u64) -> Option<(usize, Arc<Order>)> {
        self.active()
            .into_iter()
            .enumerate()
            .find(|(_, o)| o.user_id() == user_id)
            .map(|(index, order)| (index + 1, order))
    }

    /// Returns the 1-based active position of `order_id`, if it is active.
    #[must_use]
    pub fn position_of_order(&self, order_id: OrderId) -> Option<usize> {
        self.active()
            .iter()
            .position(|o| o.id() == order_id)
            .map(|index| index + 1)
    }

    /// Display names of the active view in arrival order.
    #[must_use]
    pub fn list_active(&self) -> Vec<String> {
        self.active()
            .iter()
            .map(|o| o.display_name().to_owned())
            .collect()
    }

    /// The active listing, one name per line.
    #[must_use]
    pub fn queue_string(&self) -> String {
        Self::listing_text(&self.list_active())
    }

    /// Joins display names into the listing text, one name per line.
    #[must_use]
    pub fn listing_text(names: &[String]) -> String {
        names.iter().fold(String::new(), |mut text, name| {
            text.push_str(name);
            text.push('\n');
            text
        })
    }

    /// Flags the entry of `user_id` as skipped. Returns `false` if there is
    /// no entry or it was already flagged. Nothing is removed.
    pub fn set_skip(&self, user_id: u64, clock: &dyn Clock) -> bool {
        self.snapshot()
            .iter()
            .find(|o| o.user_id() == user_id)
            .is_some_and(|o| o.request_skip(clock.now()))
    }

    /// Head of the active view, left in place.
    #[must_use]
    pub fn peek(&self) -> Option<Arc<Order>> {
        self.lock().iter().find(|o| !o.is_skip_requested()).cloned()
    }

    /// Looks up an entry by id, skip-flagged or not.
    #[must_use]
    pub fn find(&self, order_id: OrderId) -> Option<Arc<Order>> {
        self.lock().iter().find(|o| o.id() == order_id).cloned()
    }

    /// Removes an entry by id.
    pub fn remove(&self, order_id: OrderId) -> Option<Arc<Order>> {
        let mut orders = self.lock();
        let index = orders.iter().position(|o| o.id() == order_id)?;
        orders.remove(index)
    }

    /// Drops every entry, skip-flagged ones included, without notifying
    /// anyone. Returns how many were dropped.
    pub fn clear(&self) -> usize {
        let drained = std::mem::take(&mut *self.lock());
        drained.len()
    }

    /// Number of entries, skip-flagged ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if there are no entries at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Number of entries in the active view.
    #[must_use]
    pub fn active_len(&self) -> usize {
        self.lock().iter().filter(|o| !o.is_skip_requested()).count()
    }

    fn active(&self) -> Vec<Arc<Order>> {
        self.lock()
            .iter()
            .filter(|o| !o.is_skip_requested())
            .cloned()
            .collect()
    }

    fn snapshot(&self) -> Vec<Arc<Order>> {
        self.lock().iter().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Arc<Order>>> {
        self.orders.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
