//! Command handlers for guided campaigns.
//!
//! Each handler loads the campaign stream, reconstitutes the aggregate,
//! executes the command and appends whatever events it produced.

use guidebook_core::aggregate::AggregateRoot;
use guidebook_core::clock::Clock;
use guidebook_core::error::DomainError;
use guidebook_core::repository::{EventRepository, StoredEvent};
use guidebook_script::GuideSource;
use uuid::Uuid;

use crate::domain::aggregates::GuidedCampaign;
use crate::domain::commands::{CreateCampaign, RecordInput, RedoInput, ResetScenario, UndoInput};
use crate::domain::events::{GuidedCampaignEvent, GuidedCampaignEventKind};
use crate::domain::input_log::CampaignSetup;
use crate::domain::records::InputRecord;

/// Result of a successfully handled command.
#[derive(Debug)]
pub struct CampaignCommandResult {
    /// The campaign affected or created by the command.
    pub aggregate_id: Uuid,
    /// The stored events produced and persisted. Empty when the command was
    /// a no-op, such as an undo with nothing to undo.
    pub stored_events: Vec<StoredEvent>,
}

/// Reconstitutes a `GuidedCampaign` from stored events.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if event deserialization fails.
pub(crate) fn reconstitute(
    campaign_id: Uuid,
    existing_events: &[StoredEvent],
) -> Result<GuidedCampaign, DomainError> {
    let mut campaign = GuidedCampaign::new(campaign_id);
    for stored in existing_events {
        let kind: GuidedCampaignEventKind = serde_json::from_value(stored.payload.clone())
            .map_err(|e| {
                DomainError::Infrastructure(format!("event deserialization failed: {e}"))
            })?;
        campaign.apply(&GuidedCampaignEvent {
            metadata: stored.metadata(),
            kind,
        });
    }
    Ok(campaign)
}

/// Loads and reconstitutes an existing campaign.
pub(crate) async fn load(
    campaign_id: Uuid,
    repo: &dyn EventRepository,
) -> Result<GuidedCampaign, DomainError> {
    let existing_events = repo.load_events(campaign_id).await?;
    if existing_events.is_empty() {
        return Err(DomainError::CampaignNotFound(campaign_id));
    }
    reconstitute(campaign_id, &existing_events)
}

async fn persist(
    campaign: &mut GuidedCampaign,
    repo: &dyn EventRepository,
) -> Result<CampaignCommandResult, DomainError> {
    let stored_events: Vec<StoredEvent> = campaign
        .uncommitted_events()
        .iter()
        .map(StoredEvent::from_event)
        .collect();

    if !stored_events.is_empty() {
        repo.append_events(campaign.id, campaign.version(), &stored_events)
            .await?;
    }
    campaign.clear_uncommitted_events();

    Ok(CampaignCommandResult {
        aggregate_id: campaign.id,
        stored_events,
    })
}

/// Handles `CreateCampaign`: pins the current version of the guide and
/// starts a new campaign stream.
///
/// # Errors
///
/// Returns `DomainError::GuideNotFound` for an unknown guide,
/// `DomainError::Validation` for a bad roster, or the repository's error.
pub async fn handle_create_campaign(
    command: &CreateCampaign,
    guides: &dyn GuideSource,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<CampaignCommandResult, DomainError> {
    let guide = guides
        .guide(&command.guide_id)
        .ok_or_else(|| DomainError::GuideNotFound(command.guide_id.clone()))?;

    let mut campaign = GuidedCampaign::new(Uuid::new_v4());
    campaign.create(
        CampaignSetup {
            name: command.name.clone(),
            guide_id: guide.id.clone(),
            guide_version: guide.version,
            difficulty: command.difficulty,
            investigators: command.investigators.clone(),
        },
        command.correlation_id,
        clock,
    )?;

    persist(&mut campaign, repo).await
}

/// Handles `RecordInput`: appends one record to the campaign's input log.
///
/// # Errors
///
/// Returns `DomainError::CampaignNotFound` for an unknown campaign,
/// `DomainError::Validation` for a record of the wrong shape, or the
/// repository's error.
pub async fn handle_record_input(
    command: &RecordInput,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<CampaignCommandResult, DomainError> {
    let mut campaign = load(command.campaign_id, repo).await?;

    let record = InputRecord::new(
        command.record_id.unwrap_or_else(Uuid::new_v4),
        command.scenario.clone(),
        command.step.clone(),
        command.payload.clone(),
        command.recorded_at.unwrap_or_else(|| clock.now()),
    );
    campaign.record_input(record, command.correlation_id, clock)?;

    persist(&mut campaign, repo).await
}

/// Handles `UndoInput`. Nothing is appended when the bucket has nothing to
/// undo.
///
/// # Errors
///
/// Returns `DomainError::CampaignNotFound` for an unknown campaign or the
/// repository's error.
pub async fn handle_undo_input(
    command: &UndoInput,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<CampaignCommandResult, DomainError> {
    let mut campaign = load(command.campaign_id, repo).await?;
    campaign.undo_input(command.scenario.clone(), command.correlation_id, clock)?;
    persist(&mut campaign, repo).await
}

/// Handles `RedoInput`. Nothing is appended when the bucket has nothing to
/// redo.
///
/// # Errors
///
/// Returns `DomainError::CampaignNotFound` for an unknown campaign or the
/// repository's error.
pub async fn handle_redo_input(
    command: &RedoInput,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<CampaignCommandResult, DomainError> {
    let mut campaign = load(command.campaign_id, repo).await?;
    campaign.redo_input(command.scenario.clone(), command.correlation_id, clock)?;
    persist(&mut campaign, repo).await
}

/// Handles `ResetScenario`.
///
/// # Errors
///
/// Returns `DomainError::CampaignNotFound` for an unknown campaign or the
/// repository's error.
pub async fn handle_reset_scenario(
    command: &ResetScenario,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<CampaignCommandResult, DomainError> {
    let mut campaign = load(command.campaign_id, repo).await?;
    campaign.reset_scenario(command.scenario.clone(), command.correlation_id, clock)?;
    persist(&mut campaign, repo).await
}
