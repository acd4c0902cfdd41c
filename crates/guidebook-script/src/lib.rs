//! Guidebook: campaign guide script model.
//!
//! A campaign guide is the declarative, versioned rules document for every
//! scenario in a campaign. It is pure data: the interpreter in
//! `guidebook-engine` gives it meaning. This crate owns the types, the
//! YAML/JSON loader, structural validation and the guide library that the
//! API serves guides from.

pub mod error;
pub mod guide;
pub mod library;
pub mod loader;
pub mod steps;
pub mod validate;

pub use error::ScriptError;
pub use guide::{
    AchievementDef, AchievementKind, CampaignGuide, Difficulty, LogEntryDef, LogSectionDef,
    ScenarioGuide, ScenarioId, StepId,
};
pub use library::{GuideLibrary, GuideSource, LoadedGuide};
pub use steps::{
    AchievementOperation, BranchOption, Comparison, Condition, ConditionTest, CountOperation,
    Decision, Effect, InvestigatorScope, Prompt, Step, StepKind, Value,
};
