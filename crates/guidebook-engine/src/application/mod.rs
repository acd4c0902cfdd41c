//! Application services: command handlers, query handlers and the
//! projection cache.

pub mod command_handlers;
pub mod projection_cache;
pub mod query_handlers;
