//! Query handlers for guided campaigns.
//!
//! Queries reconstitute the campaign from its stream and return read-only
//! view DTOs. The processed campaign is built on demand and memoized in the
//! projection cache.

use std::sync::Arc;

use guidebook_core::aggregate::AggregateRoot;
use guidebook_core::error::DomainError;
use guidebook_core::repository::EventRepository;
use guidebook_script::{Difficulty, GuideSource, ScenarioId};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::application::command_handlers;
use crate::application::projection_cache::ProjectionCache;
use crate::domain::builder::{ProcessedCampaign, build};
use crate::domain::records::InputRecord;

/// Read-only view of a processed campaign.
#[derive(Debug, Serialize)]
pub struct ProcessedCampaignView {
    pub campaign_id: Uuid,
    pub name: String,
    pub difficulty: Difficulty,
    /// Stream version the view was built from.
    pub version: i64,
    /// Hash of the guide document the view was built with.
    pub guide_hash: String,
    #[serde(flatten)]
    pub processed: ProcessedCampaign,
}

/// Read-only view of the active records of one bucket.
#[derive(Debug, Serialize)]
pub struct InputRecordsView {
    pub campaign_id: Uuid,
    /// The scenario bucket; `None` for campaign-wide records.
    pub scenario: Option<ScenarioId>,
    pub records: Vec<InputRecord>,
    pub can_undo: bool,
    pub can_redo: bool,
    pub version: i64,
}

/// Builds the processed campaign for `campaign_id`.
///
/// # Errors
///
/// Returns `DomainError::CampaignNotFound` if no events exist,
/// `DomainError::GuideNotFound` if the campaign's guide is not loaded,
/// `DomainError::IncompatibleGuide` if the loaded guide cannot replay the
/// campaign, or `DomainError::Infrastructure` on load failures.
pub async fn get_processed_campaign(
    campaign_id: Uuid,
    guides: &dyn GuideSource,
    repo: &dyn EventRepository,
    cache: &ProjectionCache,
) -> Result<ProcessedCampaignView, DomainError> {
    let campaign = command_handlers::load(campaign_id, repo).await?;
    let input_log = campaign
        .input_log()
        .ok_or(DomainError::CampaignNotFound(campaign_id))?;
    let setup = input_log.setup();

    let guide = guides
        .guide(&setup.guide_id)
        .ok_or_else(|| DomainError::GuideNotFound(setup.guide_id.clone()))?;
    let guide_hash = guides
        .version_hash(&setup.guide_id)
        .ok_or_else(|| DomainError::GuideNotFound(setup.guide_id.clone()))?;
    let version = campaign.version();

    let processed = if let Some(cached) = cache.get(campaign_id, version, &guide_hash) {
        debug!(%campaign_id, version, "processed campaign served from cache");
        cached
    } else {
        let built = Arc::new(build(&guide, input_log)?);
        cache.insert(campaign_id, version, guide_hash.clone(), Arc::clone(&built));
        built
    };

    Ok(ProcessedCampaignView {
        campaign_id,
        name: setup.name.clone(),
        difficulty: setup.difficulty,
        version,
        guide_hash,
        processed: ProcessedCampaign::clone(&processed),
    })
}

/// Lists the active records of one bucket in log order.
///
/// # Errors
///
/// Returns `DomainError::CampaignNotFound` if no events exist or
/// `DomainError::Infrastructure` on load failures.
pub async fn get_input_records(
    campaign_id: Uuid,
    scenario: Option<ScenarioId>,
    repo: &dyn EventRepository,
) -> Result<InputRecordsView, DomainError> {
    let campaign = command_handlers::load(campaign_id, repo).await?;
    let input_log = campaign
        .input_log()
        .ok_or(DomainError::CampaignNotFound(campaign_id))?;

    Ok(InputRecordsView {
        campaign_id,
        records: input_log
            .records_for(scenario.as_ref())
            .into_iter()
            .cloned()
            .collect(),
        can_undo: input_log.can_undo(scenario.as_ref()),
        can_redo: input_log.can_redo(scenario.as_ref()),
        scenario,
        version: campaign.version(),
    })
}
