//! Route modules organized by audience.

pub mod eta;
pub mod health;
pub mod orders;
pub mod queue;
pub mod worker;
