//! Application-level handlers called by the UI layer and the worker.

pub mod command_handlers;
pub mod query_handlers;
