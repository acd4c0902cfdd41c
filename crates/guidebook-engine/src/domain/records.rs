//! Input records: one player answer or event per record.
//!
//! Records are persisted indefinitely and replayed after guide updates, so
//! their serialized form is a stable schema: a `type` tag, the payload
//! fields next to it, and a `schema_version`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use guidebook_core::error::DomainError;
use guidebook_script::{AchievementOperation, Prompt, ScenarioId, StepId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current version of the input record schema.
pub const INPUT_SCHEMA_VERSION: u16 = 1;

fn current_schema_version() -> u16 {
    INPUT_SCHEMA_VERSION
}

/// The `type` of an input record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    StartScenario,
    StartSideScenario,
    /// Starts a side scenario the guide does not script.
    StartCustomSideScenario,
    Decision,
    Count,
    Choice,
    ChoiceList,
    StringChoices,
    Text,
    Supplies,
    InterScenarioTrauma,
    CampaignLink,
    AchievementOp,
}

impl InputKind {
    /// Whether every active record of this kind applies, rather than only the
    /// last one per identity.
    ///
    /// Only achievement operations accumulate. A new kind must be added here
    /// explicitly if it should.
    #[must_use]
    pub fn is_cumulative(self) -> bool {
        match self {
            Self::AchievementOp => true,
            Self::StartScenario
            | Self::StartSideScenario
            | Self::StartCustomSideScenario
            | Self::Decision
            | Self::Count
            | Self::Choice
            | Self::ChoiceList
            | Self::StringChoices
            | Self::Text
            | Self::Supplies
            | Self::InterScenarioTrauma
            | Self::CampaignLink => false,
        }
    }

    #[must_use]
    pub fn is_start(self) -> bool {
        matches!(
            self,
            Self::StartScenario | Self::StartSideScenario | Self::StartCustomSideScenario
        )
    }

    /// The record kind that answers a prompt.
    #[must_use]
    pub fn for_prompt(prompt: &Prompt) -> Self {
        match prompt {
            Prompt::Decision => Self::Decision,
            Prompt::Count { .. } => Self::Count,
            Prompt::Choice { .. } => Self::Choice,
            Prompt::ChoiceList { .. } => Self::ChoiceList,
            Prompt::StringChoices { .. } => Self::StringChoices,
            Prompt::Text => Self::Text,
            Prompt::Supplies { .. } => Self::Supplies,
            Prompt::InterScenarioTrauma => Self::InterScenarioTrauma,
            Prompt::CampaignLink => Self::CampaignLink,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StartScenario => "start_scenario",
            Self::StartSideScenario => "start_side_scenario",
            Self::StartCustomSideScenario => "start_custom_side_scenario",
            Self::Decision => "decision",
            Self::Count => "count",
            Self::Choice => "choice",
            Self::ChoiceList => "choice_list",
            Self::StringChoices => "string_choices",
            Self::Text => "text",
            Self::Supplies => "supplies",
            Self::InterScenarioTrauma => "inter_scenario_trauma",
            Self::CampaignLink => "campaign_link",
            Self::AchievementOp => "achievement_op",
        }
    }
}

/// Trauma and experience changes for one investigator between scenarios.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraumaAdjustment {
    #[serde(default)]
    pub physical: u32,
    #[serde(default)]
    pub mental: u32,
    #[serde(default)]
    pub killed: bool,
    #[serde(default)]
    pub insane: bool,
    #[serde(default)]
    pub spent_xp: u32,
}

/// The payload of an input record, tagged by its kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputPayload {
    StartScenario {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lead_investigator: Option<String>,
    },
    StartSideScenario {
        /// The scenario this side scenario is played after.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        after: Option<ScenarioId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lead_investigator: Option<String>,
    },
    /// A side scenario played outside the guide. The record's scenario is
    /// the id it is tracked under.
    StartCustomSideScenario {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        after: Option<ScenarioId>,
        /// Experience each investigator spends to play it.
        #[serde(default)]
        xp_cost: u32,
    },
    Decision {
        decision: bool,
    },
    Count {
        count: i32,
    },
    /// Index into the prompt's options.
    Choice {
        choice: usize,
    },
    ChoiceList {
        choices: BTreeMap<String, Vec<i32>>,
    },
    StringChoices {
        choices: BTreeMap<String, Vec<String>>,
    },
    Text {
        text: String,
    },
    /// Investigator -> supply -> count.
    Supplies {
        supplies: BTreeMap<String, BTreeMap<String, i32>>,
    },
    InterScenarioTrauma {
        investigators: BTreeMap<String, TraumaAdjustment>,
    },
    CampaignLink {
        decision: String,
    },
    AchievementOp {
        achievement: String,
        operation: AchievementOperation,
        /// Overrides the guide's counter max.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<u32>,
    },
}

impl InputPayload {
    #[must_use]
    pub fn kind(&self) -> InputKind {
        match self {
            Self::StartScenario { .. } => InputKind::StartScenario,
            Self::StartSideScenario { .. } => InputKind::StartSideScenario,
            Self::StartCustomSideScenario { .. } => InputKind::StartCustomSideScenario,
            Self::Decision { .. } => InputKind::Decision,
            Self::Count { .. } => InputKind::Count,
            Self::Choice { .. } => InputKind::Choice,
            Self::ChoiceList { .. } => InputKind::ChoiceList,
            Self::StringChoices { .. } => InputKind::StringChoices,
            Self::Text { .. } => InputKind::Text,
            Self::Supplies { .. } => InputKind::Supplies,
            Self::InterScenarioTrauma { .. } => InputKind::InterScenarioTrauma,
            Self::CampaignLink { .. } => InputKind::CampaignLink,
            Self::AchievementOp { .. } => InputKind::AchievementOp,
        }
    }
}

/// Identity used for supersession: at most one record per identity is in
/// effect at a time, except for cumulative kinds.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InputIdentity {
    pub scenario: Option<ScenarioId>,
    pub step: Option<StepId>,
    pub kind: InputKind,
}

/// One entry of the input log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRecord {
    /// Unique record id, used to de-duplicate merged logs.
    pub id: Uuid,
    #[serde(default = "current_schema_version")]
    pub schema_version: u16,
    /// Scenario bucket; `None` for campaign-wide records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario: Option<ScenarioId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<StepId>,
    #[serde(flatten)]
    pub payload: InputPayload,
    pub recorded_at: DateTime<Utc>,
}

impl InputRecord {
    /// Creates a record with the current schema version.
    #[must_use]
    pub fn new(
        id: Uuid,
        scenario: Option<ScenarioId>,
        step: Option<StepId>,
        payload: InputPayload,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            schema_version: INPUT_SCHEMA_VERSION,
            scenario,
            step,
            payload,
            recorded_at,
        }
    }

    #[must_use]
    pub fn kind(&self) -> InputKind {
        self.payload.kind()
    }

    #[must_use]
    pub fn identity(&self) -> InputIdentity {
        InputIdentity {
            scenario: self.scenario.clone(),
            step: self.step.clone(),
            kind: self.kind(),
        }
    }

    /// Checks the shape of the record: start records name a scenario and no
    /// step, prompt answers name both, achievement operations need neither.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` describing the first violation.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.schema_version > INPUT_SCHEMA_VERSION {
            return Err(DomainError::Validation(format!(
                "input record schema version {} is newer than supported version {INPUT_SCHEMA_VERSION}",
                self.schema_version
            )));
        }
        if matches!(&self.payload, InputPayload::StartCustomSideScenario { name, .. } if name.trim().is_empty())
        {
            return Err(DomainError::Validation(
                "start_custom_side_scenario record requires a name".to_owned(),
            ));
        }
        let kind = self.kind();
        match kind {
            InputKind::AchievementOp => Ok(()),
            _ if kind.is_start() => match (&self.scenario, &self.step) {
                (Some(_), None) => Ok(()),
                (None, _) => Err(DomainError::Validation(format!(
                    "{} record requires a scenario",
                    kind.as_str()
                ))),
                (Some(_), Some(_)) => Err(DomainError::Validation(format!(
                    "{} record must not name a step",
                    kind.as_str()
                ))),
            },
            _ => match (&self.scenario, &self.step) {
                (Some(_), Some(_)) => Ok(()),
                _ => Err(DomainError::Validation(format!(
                    "{} record requires a scenario and a step",
                    kind.as_str()
                ))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_only_achievement_ops_are_cumulative() {
        assert!(InputKind::AchievementOp.is_cumulative());
        assert!(!InputKind::Decision.is_cumulative());
        assert!(!InputKind::Count.is_cumulative());
        assert!(!InputKind::StartScenario.is_cumulative());
    }

    #[test]
    fn test_record_serializes_with_type_tag_and_schema_version() {
        // Arrange
        let record = InputRecord::new(
            Uuid::nil(),
            Some(ScenarioId::new("the_gathering")),
            Some(StepId::new("burn_house")),
            InputPayload::Decision { decision: true },
            at(),
        );

        // Act
        let json = serde_json::to_value(&record).unwrap();

        // Assert
        assert_eq!(json["type"], "decision");
        assert_eq!(json["decision"], true);
        assert_eq!(json["scenario"], "the_gathering");
        assert_eq!(json["schema_version"], 1);
        let back: InputRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_record_without_schema_version_defaults_to_current() {
        let json = serde_json::json!({
            "id": Uuid::nil(),
            "scenario": "the_gathering",
            "type": "start_scenario",
            "recorded_at": at(),
        });

        let record: InputRecord = serde_json::from_value(json).unwrap();

        assert_eq!(record.schema_version, INPUT_SCHEMA_VERSION);
        assert_eq!(record.kind(), InputKind::StartScenario);
    }

    #[test]
    fn test_validate_rejects_answer_without_step() {
        let record = InputRecord::new(
            Uuid::nil(),
            Some(ScenarioId::new("s")),
            None,
            InputPayload::Count { count: 2 },
            at(),
        );

        assert!(matches!(record.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_validate_rejects_start_with_step() {
        let record = InputRecord::new(
            Uuid::nil(),
            Some(ScenarioId::new("s")),
            Some(StepId::new("x")),
            InputPayload::StartScenario {
                lead_investigator: None,
            },
            at(),
        );

        assert!(matches!(record.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_validate_rejects_unnamed_custom_side_scenario() {
        let record = InputRecord::new(
            Uuid::nil(),
            Some(ScenarioId::new("blood_on_the_altar")),
            None,
            InputPayload::StartCustomSideScenario {
                name: "  ".to_owned(),
                after: None,
                xp_cost: 1,
            },
            at(),
        );

        assert!(matches!(record.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_validate_accepts_campaign_wide_achievement_op() {
        let record = InputRecord::new(
            Uuid::nil(),
            None,
            None,
            InputPayload::AchievementOp {
                achievement: "elder_sign_count".to_owned(),
                operation: AchievementOperation::Inc,
                max: Some(3),
            },
            at(),
        );

        assert!(record.validate().is_ok());
    }
}
