//! Routes for browsing the loaded campaign guides.

use axum::extract::{Path, State};
use axum::{Json, Router, routing::get};
use guidebook_core::error::DomainError;
use guidebook_script::{CampaignGuide, GuideSource, LoadedGuide, ScenarioId};
use serde::Serialize;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ScenarioSummary {
    pub id: ScenarioId,
    pub name: String,
    pub side: bool,
}

/// One entry of GET /guides.
#[derive(Debug, Serialize)]
pub struct GuideSummary {
    pub id: String,
    pub name: String,
    pub version: u32,
    pub min_compatible_version: u32,
    pub version_hash: String,
    pub scenarios: Vec<ScenarioSummary>,
}

impl From<&LoadedGuide> for GuideSummary {
    fn from(loaded: &LoadedGuide) -> Self {
        let guide = &loaded.guide;
        Self {
            id: guide.id.clone(),
            name: guide.name.clone(),
            version: guide.version,
            min_compatible_version: guide.min_compatible_version,
            version_hash: loaded.version_hash.clone(),
            scenarios: guide
                .scenarios
                .iter()
                .map(|s| ScenarioSummary {
                    id: s.id.clone(),
                    name: s.name.clone(),
                    side: s.side,
                })
                .collect(),
        }
    }
}

/// GET /guides
async fn list_guides(State(state): State<AppState>) -> Json<Vec<GuideSummary>> {
    Json(
        state
            .guides
            .iter()
            .map(GuideSummary::from)
            .collect(),
    )
}

/// GET /guides/{guide_id}
async fn get_guide(
    State(state): State<AppState>,
    Path(guide_id): Path<String>,
) -> Result<Json<CampaignGuide>, ApiError> {
    let guide = state
        .guides
        .guide(&guide_id)
        .ok_or(DomainError::GuideNotFound(guide_id))?;
    Ok(Json(CampaignGuide::clone(&guide)))
}

/// Returns the router for the guide library.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_guides))
        .route("/{guide_id}", get(get_guide))
}
