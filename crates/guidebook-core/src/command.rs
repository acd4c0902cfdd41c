//! Command abstractions.
//!
//! Commands are the only way a collaborator changes a campaign: each one is
//! turned into zero or more events on the campaign's stream.

use uuid::Uuid;

/// Trait that all campaign commands implement.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// Stable name of the command, used in logs.
    fn command_type(&self) -> &'static str;

    /// Correlation ID to trace this command through the system.
    fn correlation_id(&self) -> Uuid;

    /// The campaign stream this command targets, or `None` for commands that
    /// create a new stream.
    fn campaign_id(&self) -> Option<Uuid>;
}
