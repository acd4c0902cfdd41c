//! Guidebook: the campaign-guide interpreter.
//!
//! Players never edit campaign state. They answer prompts, each answer is
//! appended to the campaign's input log, and the campaign log is re-derived
//! by folding the active inputs over the guide. This crate holds the input
//! log with its undo/redo/reset markers, the condition evaluator, the
//! campaign log builder, the per-scenario state machine and the
//! event-sourced aggregate with its command and query handlers.

pub mod application;
pub mod domain;
