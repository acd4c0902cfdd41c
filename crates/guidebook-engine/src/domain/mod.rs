//! Domain model of the interpreter.

pub mod aggregates;
pub mod builder;
pub mod campaign_log;
pub mod commands;
pub mod conditions;
pub mod diagnostics;
pub mod events;
pub mod input_log;
pub mod records;
pub mod scenario_state;

#[cfg(test)]
pub(crate) mod fixtures;
