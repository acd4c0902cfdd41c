//! Routes for guided campaigns: commands that append to the input log and
//! queries that read the processed campaign.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{
    Json, Router,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use guidebook_core::repository::StoredEvent;
use guidebook_engine::application::query_handlers::{InputRecordsView, ProcessedCampaignView};
use guidebook_engine::application::{command_handlers, query_handlers};
use guidebook_engine::domain::commands;
use guidebook_engine::domain::input_log::InvestigatorSetup;
use guidebook_engine::domain::records::InputPayload;
use guidebook_script::{Difficulty, ScenarioId, StepId};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /campaigns.
#[derive(Debug, Deserialize)]
pub struct CreateCampaignRequest {
    pub name: String,
    pub guide_id: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    pub investigators: Vec<InvestigatorSetup>,
}

/// Request body for POST /campaigns/{id}/inputs. The payload fields sit
/// beside the record fields, tagged by `type`.
#[derive(Debug, Deserialize)]
pub struct RecordInputRequest {
    #[serde(default)]
    pub record_id: Option<Uuid>,
    #[serde(default)]
    pub scenario: Option<ScenarioId>,
    #[serde(default)]
    pub step: Option<StepId>,
    #[serde(default)]
    pub recorded_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub payload: InputPayload,
}

/// Request body for undo and redo. Omitting `scenario` targets the
/// campaign-wide bucket.
#[derive(Debug, Deserialize)]
pub struct BucketRequest {
    #[serde(default)]
    pub scenario: Option<ScenarioId>,
}

/// Request body for POST /campaigns/{id}/reset.
#[derive(Debug, Deserialize)]
pub struct ResetScenarioRequest {
    pub scenario: ScenarioId,
}

#[derive(Debug, Deserialize)]
pub struct RecordsQuery {
    pub scenario: Option<ScenarioId>,
}

/// Response body for POST /campaigns.
#[derive(Debug, Serialize)]
pub struct CreateCampaignResponse {
    pub campaign_id: Uuid,
    pub event_ids: Vec<Uuid>,
}

/// Response body returned after a command is successfully handled.
#[derive(Debug, Serialize)]
pub struct CommandResponse {
    /// IDs of the domain events produced and persisted.
    pub event_ids: Vec<Uuid>,
    /// Whether the command changed the input log. Undo and redo are no-ops
    /// when the bucket has nothing to undo or redo.
    pub applied: bool,
}

impl CommandResponse {
    fn from_stored(stored_events: &[StoredEvent]) -> Self {
        Self {
            event_ids: stored_events.iter().map(|e| e.event_id).collect(),
            applied: !stored_events.is_empty(),
        }
    }
}

/// POST /campaigns
#[instrument(skip(state, request), fields(guide_id = %request.guide_id))]
async fn create_campaign(
    State(state): State<AppState>,
    Json(request): Json<CreateCampaignRequest>,
) -> Result<(StatusCode, Json<CreateCampaignResponse>), ApiError> {
    let command = commands::CreateCampaign {
        correlation_id: Uuid::new_v4(),
        name: request.name,
        guide_id: request.guide_id,
        difficulty: request.difficulty,
        investigators: request.investigators,
    };

    info!(correlation_id = %command.correlation_id, "handling create_campaign command");

    let result = command_handlers::handle_create_campaign(
        &command,
        state.guides.as_ref(),
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateCampaignResponse {
            campaign_id: result.aggregate_id,
            event_ids: result.stored_events.iter().map(|e| e.event_id).collect(),
        }),
    ))
}

/// POST /campaigns/{id}/inputs
#[instrument(skip(state, request), fields(kind = request.payload.kind().as_str()))]
async fn record_input(
    State(state): State<AppState>,
    Path(campaign_id): Path<Uuid>,
    Json(request): Json<RecordInputRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::RecordInput {
        correlation_id: Uuid::new_v4(),
        campaign_id,
        scenario: request.scenario,
        step: request.step,
        payload: request.payload,
        record_id: request.record_id,
        recorded_at: request.recorded_at,
    };

    info!(correlation_id = %command.correlation_id, "handling record_input command");

    let result = command_handlers::handle_record_input(
        &command,
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;

    Ok(Json(CommandResponse::from_stored(&result.stored_events)))
}

/// POST /campaigns/{id}/undo
#[instrument(skip(state, request))]
async fn undo_input(
    State(state): State<AppState>,
    Path(campaign_id): Path<Uuid>,
    Json(request): Json<BucketRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::UndoInput {
        correlation_id: Uuid::new_v4(),
        campaign_id,
        scenario: request.scenario,
    };

    info!(correlation_id = %command.correlation_id, "handling undo_input command");

    let result = command_handlers::handle_undo_input(
        &command,
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;

    Ok(Json(CommandResponse::from_stored(&result.stored_events)))
}

/// POST /campaigns/{id}/redo
#[instrument(skip(state, request))]
async fn redo_input(
    State(state): State<AppState>,
    Path(campaign_id): Path<Uuid>,
    Json(request): Json<BucketRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::RedoInput {
        correlation_id: Uuid::new_v4(),
        campaign_id,
        scenario: request.scenario,
    };

    info!(correlation_id = %command.correlation_id, "handling redo_input command");

    let result = command_handlers::handle_redo_input(
        &command,
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;

    Ok(Json(CommandResponse::from_stored(&result.stored_events)))
}

/// POST /campaigns/{id}/reset
#[instrument(skip(state, request), fields(scenario = %request.scenario))]
async fn reset_scenario(
    State(state): State<AppState>,
    Path(campaign_id): Path<Uuid>,
    Json(request): Json<ResetScenarioRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::ResetScenario {
        correlation_id: Uuid::new_v4(),
        campaign_id,
        scenario: request.scenario,
    };

    info!(correlation_id = %command.correlation_id, "handling reset_scenario command");

    let result = command_handlers::handle_reset_scenario(
        &command,
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;

    Ok(Json(CommandResponse::from_stored(&result.stored_events)))
}

/// GET /campaigns/{id}
#[instrument(skip(state))]
async fn get_campaign(
    State(state): State<AppState>,
    Path(campaign_id): Path<Uuid>,
) -> Result<Json<ProcessedCampaignView>, ApiError> {
    let view = query_handlers::get_processed_campaign(
        campaign_id,
        state.guides.as_ref(),
        &*state.event_repository,
        &state.projections,
    )
    .await?;
    Ok(Json(view))
}

/// GET /campaigns/{id}/records?scenario=
#[instrument(skip(state, query))]
async fn get_records(
    State(state): State<AppState>,
    Path(campaign_id): Path<Uuid>,
    Query(query): Query<RecordsQuery>,
) -> Result<Json<InputRecordsView>, ApiError> {
    let view =
        query_handlers::get_input_records(campaign_id, query.scenario, &*state.event_repository)
            .await?;
    Ok(Json(view))
}

/// Returns the router for guided campaigns.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_campaign))
        .route("/{campaign_id}", get(get_campaign))
        .route("/{campaign_id}/inputs", post(record_input))
        .route("/{campaign_id}/undo", post(undo_input))
        .route("/{campaign_id}/redo", post(redo_input))
        .route("/{campaign_id}/reset", post(reset_scenario))
        .route("/{campaign_id}/records", get(get_records))
}
