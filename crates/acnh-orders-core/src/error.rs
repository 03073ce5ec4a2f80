//! Domain error types.

use thiserror::Error;

use crate::id::OrderId;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// No order with this id is in the queue.
    #[error("order not found: {0}")]
    OrderNotFound(OrderId),

    /// The requester has no active order in the queue.
    #[error("no active order for user {0}")]
    RequesterNotFound(u64),

    /// A validation error in domain logic.
    #[error("validation error: {0}")]
    Validation(String),

    /// A lifecycle transition was rejected.
    #[error("lifecycle error: {0}")]
    Lifecycle(String),
}

/// Failure reported by a messaging collaborator while delivering a
/// notification. Never rolls back the transition that triggered it.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The requester cannot receive direct messages.
    #[error("requester {user_id} is unreachable: {reason}")]
    Unreachable {
        /// The requester that could not be reached.
        user_id: u64,
        /// Collaborator-supplied reason.
        reason: String,
    },

    /// Transport-level failure.
    #[error("delivery failed: {0}")]
    Delivery(String),
}
