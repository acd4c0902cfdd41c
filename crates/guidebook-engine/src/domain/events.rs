//! Domain events of a guided campaign.
//!
//! The event stream of a campaign is its input log: every entry of the log
//! is one event, so replaying the stream rebuilds the log exactly.

use guidebook_core::event::{DomainEvent, EventMetadata};
use guidebook_script::ScenarioId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::input_log::CampaignSetup;
use super::records::InputRecord;

pub const CAMPAIGN_CREATED: &str = "campaign.created";
pub const INPUT_RECORDED: &str = "campaign.input_recorded";
pub const INPUT_UNDONE: &str = "campaign.input_undone";
pub const INPUT_REDONE: &str = "campaign.input_redone";
pub const SCENARIO_RESET: &str = "campaign.scenario_reset";

/// Emitted once, when the campaign is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignCreated {
    pub campaign_id: Uuid,
    pub setup: CampaignSetup,
}

/// Emitted when a player input is appended to the log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputRecorded {
    pub record: InputRecord,
}

/// Emitted when the latest input of a bucket is retracted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputUndone {
    /// The scenario bucket; `None` for campaign-wide records.
    pub scenario: Option<ScenarioId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputRedone {
    pub scenario: Option<ScenarioId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioReset {
    pub scenario: ScenarioId,
}

/// Event payload variants for a guided campaign.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GuidedCampaignEventKind {
    CampaignCreated(CampaignCreated),
    InputRecorded(InputRecorded),
    InputUndone(InputUndone),
    InputRedone(InputRedone),
    ScenarioReset(ScenarioReset),
}

impl GuidedCampaignEventKind {
    /// The stored event type name of this payload.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::CampaignCreated(_) => CAMPAIGN_CREATED,
            Self::InputRecorded(_) => INPUT_RECORDED,
            Self::InputUndone(_) => INPUT_UNDONE,
            Self::InputRedone(_) => INPUT_REDONE,
            Self::ScenarioReset(_) => SCENARIO_RESET,
        }
    }
}

/// Domain event envelope for a guided campaign.
#[derive(Debug, Clone)]
pub struct GuidedCampaignEvent {
    pub metadata: EventMetadata,
    pub kind: GuidedCampaignEventKind,
}

impl DomainEvent for GuidedCampaignEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind)
            .expect("GuidedCampaignEventKind serialization is infallible")
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
