//! ACNH Orders Core — shared domain abstractions.
//!
//! This crate defines the identifiers, clock, error and event types that the
//! order queue and the API server depend on. It contains no infrastructure
//! code.

pub mod clock;
pub mod error;
pub mod event;
pub mod id;
