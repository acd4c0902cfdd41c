//! Domain error types.

use thiserror::Error;
use uuid::Uuid;

/// Errors raised at the application boundary of the interpreter.
///
/// Problems found while folding a campaign (bad script references,
/// malformed answers, cyclic scripts) are not represented here: they are
/// attached to the processed campaign as diagnostics instead.
#[derive(Debug, Error)]
pub enum DomainError {
    /// No events exist for the requested campaign.
    #[error("campaign not found: {0}")]
    CampaignNotFound(Uuid),

    /// The campaign references a guide the script source does not know.
    #[error("campaign guide not found: {0}")]
    GuideNotFound(String),

    /// The loaded guide cannot interpret the campaign's recorded inputs.
    #[error("incompatible campaign guide: {0}")]
    IncompatibleGuide(String),

    /// Optimistic concurrency conflict.
    #[error(
        "concurrency conflict on campaign {aggregate_id}: expected version {expected}, found {actual}"
    )]
    ConcurrencyConflict {
        /// The campaign stream that had the conflict.
        aggregate_id: Uuid,
        /// The expected version.
        expected: i64,
        /// The actual version found.
        actual: i64,
    },

    /// A command was rejected by domain validation.
    #[error("validation error: {0}")]
    Validation(String),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
