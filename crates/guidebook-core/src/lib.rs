//! Guidebook Core: shared domain abstractions.
//!
//! Every campaign is an event stream. This crate defines the traits that the
//! interpreter and its persistence adapters agree on: aggregates that replay
//! their stream, commands, the event envelope, the repository port, the clock
//! and the domain error. It contains no infrastructure code.

pub mod aggregate;
pub mod clock;
pub mod command;
pub mod error;
pub mod event;
pub mod repository;
