//! ACNH Orders — HTTP surface over the order queue.

pub mod config;
pub mod error;
pub mod notifier;
pub mod routes;
pub mod state;
