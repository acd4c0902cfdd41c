//! Commands accepted by a guided campaign.

use chrono::{DateTime, Utc};
use guidebook_core::command::Command;
use guidebook_script::{Difficulty, ScenarioId, StepId};
use uuid::Uuid;

use super::input_log::InvestigatorSetup;
use super::records::InputPayload;

/// Creates a campaign against the current version of a guide.
#[derive(Debug, Clone)]
pub struct CreateCampaign {
    pub correlation_id: Uuid,
    pub name: String,
    pub guide_id: String,
    pub difficulty: Difficulty,
    pub investigators: Vec<InvestigatorSetup>,
}

/// Appends one input record.
#[derive(Debug, Clone)]
pub struct RecordInput {
    pub correlation_id: Uuid,
    pub campaign_id: Uuid,
    pub scenario: Option<ScenarioId>,
    pub step: Option<StepId>,
    pub payload: InputPayload,
    /// Record id chosen by the client, so a retried request or a second
    /// device can be de-duplicated. Generated when absent.
    pub record_id: Option<Uuid>,
    /// When the input was made on the client. Defaults to now.
    pub recorded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct UndoInput {
    pub correlation_id: Uuid,
    pub campaign_id: Uuid,
    pub scenario: Option<ScenarioId>,
}

#[derive(Debug, Clone)]
pub struct RedoInput {
    pub correlation_id: Uuid,
    pub campaign_id: Uuid,
    pub scenario: Option<ScenarioId>,
}

#[derive(Debug, Clone)]
pub struct ResetScenario {
    pub correlation_id: Uuid,
    pub campaign_id: Uuid,
    pub scenario: ScenarioId,
}

macro_rules! impl_command {
    ($command:ty, $name:literal, creates) => {
        impl Command for $command {
            fn command_type(&self) -> &'static str {
                $name
            }

            fn correlation_id(&self) -> Uuid {
                self.correlation_id
            }

            fn campaign_id(&self) -> Option<Uuid> {
                None
            }
        }
    };
    ($command:ty, $name:literal) => {
        impl Command for $command {
            fn command_type(&self) -> &'static str {
                $name
            }

            fn correlation_id(&self) -> Uuid {
                self.correlation_id
            }

            fn campaign_id(&self) -> Option<Uuid> {
                Some(self.campaign_id)
            }
        }
    };
}

impl_command!(CreateCampaign, "create_campaign", creates);
impl_command!(RecordInput, "record_input");
impl_command!(UndoInput, "undo_input");
impl_command!(RedoInput, "redo_input");
impl_command!(ResetScenario, "reset_scenario");
