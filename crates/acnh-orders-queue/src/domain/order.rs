//! The order aggregate and its fulfillment state machine.

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use acnh_orders_core::clock::Clock;
use acnh_orders_core::error::{DomainError, NotifyError};
use acnh_orders_core::event::EventMetadata;
use acnh_orders_core::id::OrderId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use super::events::{
    NotificationSent, OrderCancelled, OrderEvent, OrderEventKind, OrderFinished, OrderInitializing,
    OrderReady,
};
use super::notifier::{CancelAudience, OrderNotifier};

/// Fulfillment state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderState {
    /// Queued, not yet picked up by the worker.
    Waiting,
    /// The worker is preparing the session.
    Initializing,
    /// The connection code was delivered; the requester may join.
    Ready,
    /// Fulfilled. Terminal.
    Finished,
    /// Aborted. Terminal.
    Cancelled,
}

impl OrderState {
    /// Returns `true` for `Finished` and `Cancelled`.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Cancelled)
    }

    fn can_become(self, next: Self) -> bool {
        match next {
            Self::Initializing => self == Self::Waiting,
            Self::Ready => self == Self::Initializing,
            Self::Finished | Self::Cancelled => !self.is_terminal(),
            Self::Waiting => false,
        }
    }
}

/// The person an order is for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requester {
    /// Stable identifier, used for uniqueness.
    pub user_id: u64,
    /// Human-readable label used in listings.
    pub display_name: String,
}

impl Requester {
    /// Creates a requester.
    #[must_use]
    pub fn new(user_id: u64, display_name: impl Into<String>) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
        }
    }
}

/// Order contents. Stored, never interpreted by the queue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPayload {
    /// Requested item codes.
    #[serde(default)]
    pub items: Vec<String>,
    /// Optional villager to bring along.
    #[serde(default)]
    pub companion: Option<String>,
}

/// A rejected lifecycle transition. Nothing happens when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    /// The requested state does not follow the current one.
    #[error("order {order_id} cannot move from {from:?} to {to:?}")]
    InvalidTransition {
        /// The order concerned.
        order_id: OrderId,
        /// Its current state.
        from: OrderState,
        /// The state that was requested.
        to: OrderState,
    },

    /// The order already finished or was cancelled.
    #[error("order {order_id} already reached terminal state {state:?}")]
    AlreadyTerminal {
        /// The order concerned.
        order_id: OrderId,
        /// The terminal state it is in.
        state: OrderState,
    },
}

impl From<LifecycleError> for DomainError {
    fn from(err: LifecycleError) -> Self {
        Self::Lifecycle(err.to_string())
    }
}

/// One-shot hook run on the first terminal transition.
pub type OnFinish = Box<dyn FnOnce(&Order) + Send>;

struct Progress {
    state: OrderState,
    skip_requested_at: Option<DateTime<Utc>>,
    history: Vec<OrderEvent>,
    on_finish: Option<OnFinish>,
}

/// A single requester's queued request.
///
/// Orders are shared as `Arc<Order>` between the queue and the worker; the
/// mutable part sits behind the order's own lock.
pub struct Order {
    id: OrderId,
    requester: Requester,
    payload: OrderPayload,
    created_at: DateTime<Utc>,
    progress: Mutex<Progress>,
}

impl Order {
    /// Creates a waiting order.
    #[must_use]
    pub fn new(
        id: OrderId,
        requester: Requester,
        payload: OrderPayload,
        clock: &dyn Clock,
    ) -> Self {
        Self {
            id,
            requester,
            payload,
            created_at: clock.now(),
            progress: Mutex::new(Progress {
                state: OrderState::Waiting,
                skip_requested_at: None,
                history: Vec::new(),
                on_finish: None,
            }),
        }
    }

    /// Attaches the hook fired when the order finishes or is cancelled.
    /// Replaces any hook set earlier.
    #[must_use]
    pub fn with_on_finish(self, hook: impl FnOnce(&Order) + Send + 'static) -> Self {
        self.progress().on_finish = Some(Box::new(hook));
        self
    }

    /// Returns the order identifier.
    #[must_use]
    pub fn id(&self) -> OrderId {
        self.id
    }

    /// Returns the requester.
    #[must_use]
    pub fn requester(&self) -> &Requester {
        &self.requester
    }

    /// Returns the requester's stable identifier.
    #[must_use]
    pub fn user_id(&self) -> u64 {
        self.requester.user_id
    }

    /// Returns the requester's display name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.requester.display_name
    }

    /// Returns the order contents.
    #[must_use]
    pub fn payload(&self) -> &OrderPayload {
        &self.payload
    }

    /// Returns when the order was created.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> OrderState {
        self.progress().state
    }

    /// Returns `true` once a moderator asked for this order to be skipped.
    #[must_use]
    pub fn is_skip_requested(&self) -> bool {
        self.progress().skip_requested_at.is_some()
    }

    /// Returns when the skip flag was set.
    #[must_use]
    pub fn skip_requested_at(&self) -> Option<DateTime<Utc>> {
        self.progress().skip_requested_at
    }

    /// Returns a copy of the recorded lifecycle events, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<OrderEvent> {
        self.progress().history.clone()
    }

    /// Sets the skip flag. Returns `false` if it was already set.
    pub(crate) fn request_skip(&self, at: DateTime<Utc>) -> bool {
        let mut progress = self.progress();
        if progress.skip_requested_at.is_some() {
            return false;
        }
        progress.skip_requested_at = Some(at);
        true
    }

    /// `Waiting → Initializing`. Tells the requester to get ready.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError` if the order is not waiting.
    pub fn notify_initializing(
        &self,
        message: &str,
        notifier: &dyn OrderNotifier,
        clock: &dyn Clock,
    ) -> Result<(), LifecycleError> {
        let kind = OrderEventKind::Initializing(OrderInitializing {
            order_id: self.id,
            message: message.to_owned(),
        });
        self.transition(OrderState::Initializing, kind, clock)?;
        self.delivered(notifier.order_initializing(self, message));
        Ok(())
    }

    /// `Initializing → Ready`. Hands the connection code to the requester.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError` if the order is not initializing.
    pub fn notify_ready(
        &self,
        message: &str,
        connection_code: &str,
        notifier: &dyn OrderNotifier,
        clock: &dyn Clock,
    ) -> Result<(), LifecycleError> {
        let kind = OrderEventKind::Ready(OrderReady {
            order_id: self.id,
            message: message.to_owned(),
        });
        self.transition(OrderState::Ready, kind, clock)?;
        self.delivered(notifier.order_ready(self, message, connection_code));
        Ok(())
    }

    /// Any non-terminal state `→ Finished`. Fires the on-finish hook.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::AlreadyTerminal` if the order already ended;
    /// the hook is not fired again.
    pub fn notify_finished(
        &self,
        message: &str,
        notifier: &dyn OrderNotifier,
        clock: &dyn Clock,
    ) -> Result<(), LifecycleError> {
        let kind = OrderEventKind::Finished(OrderFinished {
            order_id: self.id,
            message: message.to_owned(),
        });
        let hook = self.transition(OrderState::Finished, kind, clock)?;
        self.fire(hook);
        self.delivered(notifier.order_finished(self, message));
        Ok(())
    }

    /// Any non-terminal state `→ Cancelled`. Fires the on-finish hook.
    ///
    /// A `faulted` cancellation is reported to the requester only.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::AlreadyTerminal` if the order already ended;
    /// the hook is not fired again.
    pub fn notify_cancelled(
        &self,
        message: &str,
        faulted: bool,
        notifier: &dyn OrderNotifier,
        clock: &dyn Clock,
    ) -> Result<(), LifecycleError> {
        let kind = OrderEventKind::Cancelled(OrderCancelled {
            order_id: self.id,
            message: message.to_owned(),
            faulted,
        });
        let hook = self.transition(OrderState::Cancelled, kind, clock)?;
        self.fire(hook);
        self.delivered(notifier.order_cancelled(
            self,
            message,
            CancelAudience::from_faulted(faulted),
        ));
        Ok(())
    }

    /// Sends a freeform message. Allowed in every state.
    pub fn send_notification(
        &self,
        message: &str,
        notifier: &dyn OrderNotifier,
        clock: &dyn Clock,
    ) {
        let kind = OrderEventKind::NotificationSent(NotificationSent {
            order_id: self.id,
            message: message.to_owned(),
        });
        let mut progress = self.progress();
        let event = self.event(&progress, kind, clock);
        progress.history.push(event);
        drop(progress);
        self.delivered(notifier.notification(self, message));
    }

    /// Applies a state change under the lock and hands back the hook if the
    /// new state is terminal. Notifications run after the lock is released.
    fn transition(
        &self,
        to: OrderState,
        kind: OrderEventKind,
        clock: &dyn Clock,
    ) -> Result<Option<OnFinish>, LifecycleError> {
        let mut progress = self.progress();
        let from = progress.state;
        if from.is_terminal() {
            return Err(LifecycleError::AlreadyTerminal {
                order_id: self.id,
                state: from,
            });
        }
        if !from.can_become(to) {
            return Err(LifecycleError::InvalidTransition {
                order_id: self.id,
                from,
                to,
            });
        }

        let event = self.event(&progress, kind, clock);
        progress.history.push(event);
        progress.state = to;

        Ok(if to.is_terminal() {
            progress.on_finish.take()
        } else {
            None
        })
    }

    fn event(&self, progress: &Progress, kind: OrderEventKind, clock: &dyn Clock) -> OrderEvent {
        #[allow(clippy::cast_possible_truncation)]
        let sequence_number = progress.history.len() as u32 + 1;
        OrderEvent {
            metadata: EventMetadata {
                event_id: Uuid::new_v4(),
                event_type: kind.event_type().to_owned(),
                order_id: self.id,
                sequence_number,
                occurred_at: clock.now(),
            },
            kind,
        }
    }

    fn fire(&self, hook: Option<OnFinish>) {
        if let Some(hook) = hook {
            hook(self);
        }
    }

    fn delivered(&self, result: Result<(), NotifyError>) {
        if let Err(err) = result {
            warn!(
                order_id = %self.id,
                user_id = self.requester.user_id,
                error = %err,
                "notification not delivered"
            );
        }
    }

    fn progress(&self) -> MutexGuard<'_, Progress> {
        self.progress.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let progress = self.progress();
        f.debug_struct("Order")
            .field("id", &self.id)
            .field("requester", &self.requester)
            .field("payload", &self.payload)
            .field("created_at", &self.created_at)
            .field("state", &progress.state)
            .field("skip_requested_at", &progress.skip_requested_at)
            .field("history_len", &progress.history.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use acnh_orders_test_support::FixedClock;
    use chrono::TimeZone;

    use crate::domain::events::{ORDER_FINISHED_EVENT_TYPE, ORDER_INITIALIZING_EVENT_TYPE};

    /// Records the name of every callback it receives.
    #[derive(Default)]
    struct Calls(Mutex<Vec<String>>);

    impl Calls {
        fn names(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }

        fn push(&self, name: &str) -> Result<(), NotifyError> {
            self.0.lock().unwrap().push(name.to_owned());
            Ok(())
        }
    }

    impl OrderNotifier for Calls {
        fn order_initializing(&self, _: &Order, _: &str) -> Result<(), NotifyError> {
            self.push("initializing")
        }

        fn order_ready(&self, _: &Order, _: &str, code: &str) -> Result<(), NotifyError> {
            self.push(&format!("ready:{code}"))
        }

        fn order_finished(&self, _: &Order, _: &str) -> Result<(), NotifyError> {
            self.push("finished")
        }

        fn order_cancelled(
            &self,
            _: &Order,
            _: &str,
            audience: CancelAudience,
        ) -> Result<(), NotifyError> {
            self.push(&format!("cancelled:{audience:?}"))
        }

        fn notification(&self, _: &Order, message: &str) -> Result<(), NotifyError> {
            self.push(&format!("note:{message}"))
        }
    }

    /// Fails every delivery.
    struct Unreachable;

    impl OrderNotifier for Unreachable {
        fn order_initializing(&self, order: &Order, _: &str) -> Result<(), NotifyError> {
            Err(unreachable_error(order))
        }

        fn order_ready(&self, order: &Order, _: &str, _: &str) -> Result<(), NotifyError> {
            Err(unreachable_error(order))
        }

        fn order_finished(&self, order: &Order, _: &str) -> Result<(), NotifyError> {
            Err(unreachable_error(order))
        }

        fn order_cancelled(
            &self,
            order: &Order,
            _: &str,
            _: CancelAudience,
        ) -> Result<(), NotifyError> {
            Err(unreachable_error(order))
        }

        fn notification(&self, order: &Order, _: &str) -> Result<(), NotifyError> {
            Err(unreachable_error(order))
        }
    }

    fn unreachable_error(order: &Order) -> NotifyError {
        NotifyError::Unreachable {
            user_id: order.user_id(),
            reason: "direct messages disabled".to_owned(),
        }
    }

    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap())
    }

    fn order_with_counter(clock: &FixedClock) -> (Order, Arc<AtomicUsize>) {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        let order = Order::new(
            OrderId(7),
            Requester::new(1001, "Tom"),
            OrderPayload::default(),
            clock,
        )
        .with_on_finish(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (order, fired)
    }

    #[test]
    fn test_new_order_is_waiting_with_empty_history() {
        // Arrange
        let clock = clock();

        // Act
        let order = Order::new(
            OrderId(0),
            Requester::new(1, "Isabelle"),
            OrderPayload::default(),
            &clock,
        );

        // Assert
        assert_eq!(order.state(), OrderState::Waiting);
        assert!(!order.is_skip_requested());
        assert!(order.history().is_empty());
        assert_eq!(order.created_at(), clock.0);
    }

    #[test]
    fn test_full_lifecycle_records_events_and_notifies_in_order() {
        // Arrange
        let clock = clock();
        let calls = Calls::default();
        let (order, fired) = order_with_counter(&clock);

        // Act
        order.notify_initializing("", &calls, &clock).unwrap();
        order.notify_ready("see you", "ABCDE", &calls, &clock).unwrap();
        order.notify_finished("", &calls, &clock).unwrap();

        // Assert
        assert_eq!(order.state(), OrderState::Finished);
        assert_eq!(calls.names(), vec!["initializing", "ready:ABCDE", "finished"]);
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        let history = order.history();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].metadata.event_type, ORDER_INITIALIZING_EVENT_TYPE);
        assert_eq!(history[0].metadata.sequence_number, 1);
        assert_eq!(history[2].metadata.event_type, ORDER_FINISHED_EVENT_TYPE);
        assert_eq!(history[2].metadata.sequence_number, 3);
        assert_eq!(history[2].metadata.occurred_at, clock.0);
    }

    #[test]
    fn test_second_terminal_notification_does_not_fire_hook_again() {
        // Arrange
        let clock = clock();
        let calls = Calls::default();
        let (order, fired) = order_with_counter(&clock);

        // Act
        order.notify_finished("done", &calls, &clock).unwrap();
        let result = order.notify_cancelled("late", false, &calls, &clock);

        // Assert
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(
            result,
            Err(LifecycleError::AlreadyTerminal {
                order_id: OrderId(7),
                state: OrderState::Finished,
            })
        );
        assert_eq!(order.state(), OrderState::Finished);
        assert_eq!(calls.names(), vec!["finished"]);
    }

    #[test]
    fn test_cancel_from_waiting_fires_hook_and_selects_audience() {
        // Arrange
        let clock = clock();
        let calls = Calls::default();
        let (order, fired) = order_with_counter(&clock);

        // Act
        order.notify_cancelled("switch crashed", true, &calls, &clock).unwrap();

        // Assert
        assert_eq!(order.state(), OrderState::Cancelled);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(calls.names(), vec!["cancelled:RequesterOnly"]);
    }

    #[test]
    fn test_ready_before_initializing_is_rejected_without_side_effects() {
        // Arrange
        let clock = clock();
        let calls = Calls::default();
        let (order, _fired) = order_with_counter(&clock);

        // Act
        let result = order.notify_ready("", "ABCDE", &calls, &clock);

        // Assert
        assert_eq!(
            result,
            Err(LifecycleError::InvalidTransition {
                order_id: OrderId(7),
                from: OrderState::Waiting,
                to: OrderState::Ready,
            })
        );
        assert_eq!(order.state(), OrderState::Waiting);
        assert!(order.history().is_empty());
        assert!(calls.names().is_empty());
    }

    #[test]
    fn test_failed_delivery_keeps_transition() {
        // Arrange
        let clock = clock();
        let (order, fired) = order_with_counter(&clock);

        // Act
        order.notify_initializing("", &Unreachable, &clock).unwrap();
        order.notify_finished("", &Unreachable, &clock).unwrap();

        // Assert
        assert_eq!(order.state(), OrderState::Finished);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_send_notification_records_event_without_state_change() {
        // Arrange
        let clock = clock();
        let calls = Calls::default();
        let (order, fired) = order_with_counter(&clock);

        // Act
        order.send_notification("hang tight", &calls, &clock);

        // Assert
        assert_eq!(order.state(), OrderState::Waiting);
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert_eq!(calls.names(), vec!["note:hang tight"]);
        assert_eq!(order.history().len(), 1);
    }

    #[test]
    fn test_concurrent_terminal_calls_fire_hook_once() {
        // Arrange
        let clock = clock();
        let (order, fired) = order_with_counter(&clock);
        let order = Arc::new(order);
        let barrier = Arc::new(std::sync::Barrier::new(8));

        // Act
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let order = Arc::clone(&order);
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    let calls = Calls::default();
                    barrier.wait();
                    if i % 2 == 0 {
                        order.notify_finished("", &calls, &clock).is_ok()
                    } else {
                        order.notify_cancelled("", false, &calls, &clock).is_ok()
                    }
                })
            })
            .collect();
        let successes = handles
            .into_iter()
            .map(|h| h.join().expect("lifecycle thread panicked"))
            .filter(|ok| *ok)
            .count();

        // Assert
        assert_eq!(successes, 1);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_request_skip_is_set_once() {
        // Arrange
        let clock = clock();
        let (order, _) = order_with_counter(&clock);

        // Act
        let first = order.request_skip(clock.0);
        let second = order.request_skip(clock.0);

        // Assert
        assert!(first);
        assert!(!second);
        assert_eq!(order.skip_requested_at(), Some(clock.0));
    }
}
