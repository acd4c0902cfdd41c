//! Integration tests for the guide routes.

mod common;

use axum::http::StatusCode;

#[tokio::test]
async fn test_list_guides_under_api_prefix() {
    let app = common::build_test_app();

    let (status, json) = common::get_json(&app, "/api/v1/guides").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json[0]["id"], "night_of_the_zealot");
    assert_eq!(json[0]["scenarios"][0]["id"], "prologue");
}

#[tokio::test]
async fn test_created_campaign_reports_guide_hash_of_listed_guide() {
    // Arrange
    let app = common::build_test_app();
    let (_, guides) = common::get_json(&app, "/api/v1/guides").await;
    let id = common::create_campaign(&app).await;

    // Act
    let (_, campaign) = common::get_json(&app, &format!("/api/v1/campaigns/{id}")).await;

    // Assert
    assert_eq!(campaign["guide_hash"], guides[0]["version_hash"]);
    assert_eq!(campaign["guide_version"], guides[0]["version"]);
}
