//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Duration, TimeZone, Utc};
use guidebook_core::repository::EventRepository;
use guidebook_script::GuideLibrary;
use guidebook_test_support::{InMemoryEventRepository, SteppingClock, sample_guide};
use http_body_util::BodyExt;
use tower::ServiceExt;

use guidebook_api::app;
use guidebook_api::state::AppState;

/// Build the full app over `event_repository`, the sample guide and a clock
/// that advances one minute per read, starting at 2026-01-15 10:00 UTC.
pub fn build_app_with(event_repository: Arc<dyn EventRepository>) -> Router {
    let clock = SteppingClock::new(
        Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
        Duration::minutes(1),
    );
    let mut guides = GuideLibrary::new();
    guides.insert(sample_guide()).unwrap();
    app(AppState::new(Arc::new(clock), event_repository, Arc::new(guides)))
}

/// Build the full app over a fresh in-memory event store.
pub fn build_test_app() -> Router {
    build_app_with(Arc::new(InMemoryEventRepository::new()))
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: &Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a GET request and return the response.
pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Create a campaign over the sample guide with Roland and Agnes; returns
/// its id.
pub async fn create_campaign(app: &Router) -> String {
    let (status, json) = post_json(
        app,
        "/api/v1/campaigns",
        &serde_json::json!({
            "name": "Arkham nights",
            "guide_id": "night_of_the_zealot",
            "difficulty": "standard",
            "investigators": [
                { "id": "roland", "name": "Roland Banks", "health": 9, "sanity": 5 },
                { "id": "agnes", "name": "Agnes Baker", "health": 6, "sanity": 8 }
            ]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    json["campaign_id"].as_str().unwrap().to_owned()
}

/// The state of `scenario` in a processed campaign response.
pub fn scenario<'a>(campaign: &'a serde_json::Value, scenario: &str) -> &'a serde_json::Value {
    campaign["scenarios"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["scenario_id"] == scenario)
        .unwrap()
}
