//! Build errors and diagnostics.

use guidebook_core::error::DomainError;
use guidebook_script::{ScenarioId, StepId};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// A problem found while folding a campaign. Diagnostics never abort a build;
/// they are reported alongside the processed campaign.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BuildDiagnostic {
    /// The step references a log entry, achievement, step or investigator
    /// that does not exist. The step was skipped.
    #[error("scenario {scenario}: step {step}: {detail}")]
    ScriptReference {
        scenario: ScenarioId,
        step: StepId,
        detail: String,
    },

    /// A recorded input does not fit the prompt (or guide) it answers. The
    /// input is treated as missing.
    #[error("input record {record_id} is malformed: {detail}")]
    MalformedInput {
        record_id: Uuid,
        scenario: Option<ScenarioId>,
        step: Option<StepId>,
        detail: String,
    },

    /// The walk visited more steps than the scenario has. Every change the
    /// scenario made was rolled back.
    #[error("scenario {scenario}: step {step} loops; scenario walk abandoned")]
    CyclicScript { scenario: ScenarioId, step: StepId },

    #[error("scenario {scenario}: {detail}")]
    InvalidTransition { scenario: ScenarioId, detail: String },
}

/// Errors that prevent a build entirely.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("campaign uses guide {campaign_guide}, but guide {guide} was supplied")]
    GuideMismatch {
        campaign_guide: String,
        guide: String,
    },

    #[error(
        "guide {guide_id} version {guide_version} (compatible from {min_compatible_version}) cannot replay a campaign created against version {campaign_version}"
    )]
    IncompatibleGuide {
        guide_id: String,
        guide_version: u32,
        min_compatible_version: u32,
        campaign_version: u32,
    },
}

impl From<EngineError> for DomainError {
    fn from(error: EngineError) -> Self {
        DomainError::IncompatibleGuide(error.to_string())
    }
}

/// A step references something the guide does not define.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ScriptReferenceError(pub String);

impl ScriptReferenceError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self(detail.into())
    }
}
