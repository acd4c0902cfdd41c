//! Integration tests for the campaign routes over the in-memory event store.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{create_campaign, get_json, post_json, scenario};

async fn start(app: &axum::Router, id: &str, scenario: &str) {
    let (status, json) = post_json(
        app,
        &format!("/api/v1/campaigns/{id}/inputs"),
        &json!({ "scenario": scenario, "type": "start_scenario" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{json}");
}

async fn answer(app: &axum::Router, id: &str, scenario: &str, step: &str, payload: serde_json::Value) {
    let mut body = payload;
    body["scenario"] = scenario.into();
    body["step"] = step.into();
    let (status, json) = post_json(app, &format!("/api/v1/campaigns/{id}/inputs"), &body).await;
    assert_eq!(status, StatusCode::OK, "{json}");
}

#[tokio::test]
async fn test_new_campaign_has_only_implicit_scenarios_played() {
    // Arrange
    let app = common::build_test_app();
    let id = create_campaign(&app).await;

    // Act
    let (status, campaign) = get_json(&app, &format!("/api/v1/campaigns/{id}")).await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(campaign["campaign_id"], id);
    assert_eq!(campaign["version"], 1);
    assert_eq!(campaign["guide_id"], "night_of_the_zealot");
    assert_eq!(scenario(&campaign, "prologue")["state"], "completed");
    assert_eq!(scenario(&campaign, "the_gathering")["state"], "not_started");
    assert_eq!(campaign["campaign_log"]["chaos_bag"]["skull"], 2);
    assert!(campaign["diagnostics"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_gathering_round_trip_with_undo_and_redo() {
    // Arrange
    let app = common::build_test_app();
    let id = create_campaign(&app).await;
    start(&app, &id, "the_gathering").await;

    // Act / Assert: waiting on the first prompt.
    let (_, campaign) = get_json(&app, &format!("/api/v1/campaigns/{id}")).await;
    let gathering = scenario(&campaign, "the_gathering");
    assert_eq!(gathering["state"], "started");
    assert_eq!(gathering["pending_at"], "victory_points");

    answer(&app, &id, "the_gathering", "victory_points", json!({ "type": "count", "count": 4 })).await;
    answer(&app, &id, "the_gathering", "burn_house", json!({ "type": "decision", "decision": true })).await;

    let (_, campaign) = get_json(&app, &format!("/api/v1/campaigns/{id}")).await;
    let gathering = scenario(&campaign, "the_gathering");
    assert_eq!(gathering["state"], "completed");
    assert_eq!(gathering["resolution"], "R1");
    let log = &campaign["campaign_log"];
    assert_eq!(log["sections"]["campaign_notes"][0]["id"], "house_burned_down");
    assert_eq!(log["investigators"]["roland"]["total_xp"], 4);
    assert_eq!(log["investigators"]["agnes"]["total_xp"], 4);
    assert_eq!(log["investigators"]["roland"]["mental"], 1);

    // Undo the decision: back to waiting on it, nothing from R1 survives.
    let (status, undo) = post_json(
        &app,
        &format!("/api/v1/campaigns/{id}/undo"),
        &json!({ "scenario": "the_gathering" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(undo["applied"], true);

    let (_, campaign) = get_json(&app, &format!("/api/v1/campaigns/{id}")).await;
    let gathering = scenario(&campaign, "the_gathering");
    assert_eq!(gathering["state"], "started");
    assert_eq!(gathering["pending_at"], "burn_house");
    assert_eq!(campaign["campaign_log"]["investigators"]["roland"]["total_xp"], 0);
    assert!(campaign["campaign_log"]["sections"]["campaign_notes"].is_null());

    // Redo restores the decision.
    post_json(
        &app,
        &format!("/api/v1/campaigns/{id}/redo"),
        &json!({ "scenario": "the_gathering" }),
    )
    .await;
    let (_, campaign) = get_json(&app, &format!("/api/v1/campaigns/{id}")).await;
    assert_eq!(scenario(&campaign, "the_gathering")["resolution"], "R1");
}

#[tokio::test]
async fn test_undo_with_nothing_to_undo_is_not_applied() {
    let app = common::build_test_app();
    let id = create_campaign(&app).await;

    let (status, json) = post_json(&app, &format!("/api/v1/campaigns/{id}/undo"), &json!({})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["applied"], false);
    assert!(json["event_ids"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_later_answer_supersedes_earlier_one() {
    // Arrange
    let app = common::build_test_app();
    let id = create_campaign(&app).await;
    start(&app, &id, "the_gathering").await;
    answer(&app, &id, "the_gathering", "victory_points", json!({ "type": "count", "count": 4 })).await;
    answer(&app, &id, "the_gathering", "burn_house", json!({ "type": "decision", "decision": true })).await;

    // Act
    answer(&app, &id, "the_gathering", "burn_house", json!({ "type": "decision", "decision": false })).await;

    // Assert
    let (_, campaign) = get_json(&app, &format!("/api/v1/campaigns/{id}")).await;
    assert_eq!(scenario(&campaign, "the_gathering")["resolution"], "R2");
    let notes: Vec<&str> = campaign["campaign_log"]["sections"]["campaign_notes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["id"].as_str().unwrap())
        .collect();
    assert_eq!(notes, vec!["house_standing", "ghoul_priest_alive"]);
}

#[tokio::test]
async fn test_reset_clears_scenario_records() {
    // Arrange
    let app = common::build_test_app();
    let id = create_campaign(&app).await;
    start(&app, &id, "the_gathering").await;
    answer(&app, &id, "the_gathering", "victory_points", json!({ "type": "count", "count": 2 })).await;

    // Act
    let (status, json) = post_json(
        &app,
        &format!("/api/v1/campaigns/{id}/reset"),
        &json!({ "scenario": "the_gathering" }),
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["applied"], true);
    let (_, records) = get_json(
        &app,
        &format!("/api/v1/campaigns/{id}/records?scenario=the_gathering"),
    )
    .await;
    assert!(records["records"].as_array().unwrap().is_empty());
    let (_, campaign) = get_json(&app, &format!("/api/v1/campaigns/{id}")).await;
    assert_eq!(scenario(&campaign, "the_gathering")["state"], "not_started");
}

#[tokio::test]
async fn test_records_lists_bucket_with_client_ids() {
    // Arrange
    let app = common::build_test_app();
    let id = create_campaign(&app).await;
    let record_id = uuid::Uuid::new_v4();
    post_json(
        &app,
        &format!("/api/v1/campaigns/{id}/inputs"),
        &json!({
            "record_id": record_id,
            "scenario": "the_gathering",
            "type": "start_scenario",
            "lead_investigator": "agnes"
        }),
    )
    .await;

    // Act
    let (status, records) = get_json(
        &app,
        &format!("/api/v1/campaigns/{id}/records?scenario=the_gathering"),
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(records["can_undo"], true);
    assert_eq!(records["can_redo"], false);
    let listed = records["records"].as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], record_id.to_string());
    assert_eq!(listed[0]["lead_investigator"], "agnes");
    assert_eq!(listed[0]["recorded_at"], "2026-01-15T10:01:00Z");
}

#[tokio::test]
async fn test_answer_without_step_is_rejected() {
    let app = common::build_test_app();
    let id = create_campaign(&app).await;

    let (status, json) = post_json(
        &app,
        &format!("/api/v1/campaigns/{id}/inputs"),
        &json!({ "scenario": "the_gathering", "type": "count", "count": 3 }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");
}

#[tokio::test]
async fn test_malformed_answer_is_reported_as_diagnostic() {
    // Arrange: victory points above the prompt's max.
    let app = common::build_test_app();
    let id = create_campaign(&app).await;
    start(&app, &id, "the_gathering").await;
    answer(&app, &id, "the_gathering", "victory_points", json!({ "type": "count", "count": 99 })).await;

    // Act
    let (status, campaign) = get_json(&app, &format!("/api/v1/campaigns/{id}")).await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    let gathering = scenario(&campaign, "the_gathering");
    assert_eq!(gathering["pending_at"], "victory_points");
    let diagnostics = campaign["diagnostics"].as_array().unwrap();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0]["kind"], "malformed_input");
}

#[tokio::test]
async fn test_get_unknown_campaign_returns_404() {
    let app = common::build_test_app();

    let (status, json) =
        get_json(&app, &format!("/api/v1/campaigns/{}", uuid::Uuid::new_v4())).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "campaign_not_found");
}

#[tokio::test]
async fn test_custom_side_scenario_is_listed_as_played() {
    // Arrange
    let app = common::build_test_app();
    let id = create_campaign(&app).await;

    // Act
    let (status, json) = post_json(
        &app,
        &format!("/api/v1/campaigns/{id}/inputs"),
        &json!({
            "scenario": "blood_on_the_altar",
            "type": "start_custom_side_scenario",
            "name": "Blood on the Altar",
            "after": "prologue",
            "xp_cost": 1
        }),
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::OK, "{json}");
    let (_, campaign) = get_json(&app, &format!("/api/v1/campaigns/{id}")).await;
    let custom = scenario(&campaign, "blood_on_the_altar");
    assert_eq!(custom["state"], "completed");
    assert_eq!(custom["custom_name"], "Blood on the Altar");
    assert_eq!(campaign["scenarios"][1]["scenario_id"], "blood_on_the_altar");
    assert_eq!(campaign["campaign_log"]["investigators"]["roland"]["spent_xp"], 1);
}
