//! Order queue domain: the order aggregate, its lifecycle, the queue and the
//! wait-time estimate.

pub mod commands;
pub mod eta;
pub mod events;
pub mod notifier;
pub mod order;
pub mod queue;
