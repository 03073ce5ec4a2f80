//! ACNH Orders — order queue and fulfillment lifecycle.
//!
//! Queues requests for the single automated island session, keeps one
//! active entry per requester, estimates waits, and defines the contract the
//! fulfillment worker follows while serving each order.

pub mod application;
pub mod config;
pub mod domain;
pub mod hub;
