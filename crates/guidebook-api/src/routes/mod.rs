//! Route modules.

pub mod campaigns;
pub mod guides;
pub mod health;
