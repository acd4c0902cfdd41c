//! Integration tests for `PgEventRepository`.
//!
//! These need a PostgreSQL server (`DATABASE_URL`) and are ignored by
//! default: run them with `cargo test -- --ignored`.

use chrono::{TimeZone, Utc};
use guidebook_core::error::DomainError;
use guidebook_core::repository::{EventRepository, StoredEvent};
use guidebook_event_store::pg_event_repository::PgEventRepository;
use sqlx::PgPool;
use uuid::Uuid;

fn make_stored_event(aggregate_id: Uuid, sequence_number: i64) -> StoredEvent {
    StoredEvent {
        event_id: Uuid::new_v4(),
        aggregate_id,
        event_type: "campaign.input_recorded".to_string(),
        payload: serde_json::json!({
            "InputRecorded": {
                "record": {
                    "id": Uuid::new_v4(),
                    "schema_version": 1,
                    "scenario": "the_gathering",
                    "step": "burn_house",
                    "type": "decision",
                    "decision": true,
                    "recorded_at": "2026-01-15T10:00:00Z"
                }
            }
        }),
        sequence_number,
        correlation_id: Uuid::new_v4(),
        causation_id: Uuid::new_v4(),
        occurred_at: Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
    }
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires PostgreSQL"]
async fn test_load_events_returns_empty_vec_for_unknown_campaign(pool: PgPool) {
    let repo = PgEventRepository::new(pool);

    let events = repo.load_events(Uuid::new_v4()).await.unwrap();

    assert!(events.is_empty());
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires PostgreSQL"]
async fn test_append_and_load_single_event(pool: PgPool) {
    // Arrange
    let repo = PgEventRepository::new(pool);
    let aggregate_id = Uuid::new_v4();
    let event = make_stored_event(aggregate_id, 1);
    let expected = event.clone();

    // Act
    repo.append_events(aggregate_id, 0, &[event]).await.unwrap();
    let loaded = repo.load_events(aggregate_id).await.unwrap();

    // Assert
    assert_eq!(loaded, vec![expected]);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires PostgreSQL"]
async fn test_load_orders_by_sequence_number(pool: PgPool) {
    let repo = PgEventRepository::new(pool);
    let aggregate_id = Uuid::new_v4();
    let events = vec![
        make_stored_event(aggregate_id, 1),
        make_stored_event(aggregate_id, 2),
        make_stored_event(aggregate_id, 3),
    ];

    repo.append_events(aggregate_id, 0, &events).await.unwrap();

    let sequence: Vec<i64> = repo
        .load_events(aggregate_id)
        .await
        .unwrap()
        .iter()
        .map(|e| e.sequence_number)
        .collect();
    assert_eq!(sequence, vec![1, 2, 3]);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires PostgreSQL"]
async fn test_campaign_streams_are_isolated(pool: PgPool) {
    let repo = PgEventRepository::new(pool);
    let first = Uuid::new_v4();
    let second = Uuid::new_v4();

    repo.append_events(first, 0, &[make_stored_event(first, 1)])
        .await
        .unwrap();
    repo.append_events(second, 0, &[make_stored_event(second, 1)])
        .await
        .unwrap();

    let loaded = repo.load_events(first).await.unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].aggregate_id, first);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires PostgreSQL"]
async fn test_stale_expected_version_is_a_conflict(pool: PgPool) {
    // Arrange
    let repo = PgEventRepository::new(pool);
    let aggregate_id = Uuid::new_v4();
    repo.append_events(
        aggregate_id,
        0,
        &[
            make_stored_event(aggregate_id, 1),
            make_stored_event(aggregate_id, 2),
        ],
    )
    .await
    .unwrap();

    // Act: sequence numbers do not collide, the version check still rejects.
    let result = repo
        .append_events(aggregate_id, 0, &[make_stored_event(aggregate_id, 3)])
        .await;

    // Assert
    match result {
        Err(DomainError::ConcurrencyConflict {
            aggregate_id: conflict_id,
            expected,
            actual,
        }) => {
            assert_eq!(conflict_id, aggregate_id);
            assert_eq!(expected, 0);
            assert_eq!(actual, 2);
        }
        other => panic!("expected ConcurrencyConflict, got {other:?}"),
    }
    assert_eq!(repo.load_events(aggregate_id).await.unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires PostgreSQL"]
async fn test_sequential_appends_with_correct_expected_version(pool: PgPool) {
    let repo = PgEventRepository::new(pool);
    let aggregate_id = Uuid::new_v4();

    repo.append_events(aggregate_id, 0, &[make_stored_event(aggregate_id, 1)])
        .await
        .unwrap();
    repo.append_events(aggregate_id, 1, &[make_stored_event(aggregate_id, 2)])
        .await
        .unwrap();

    assert_eq!(repo.load_events(aggregate_id).await.unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires PostgreSQL"]
async fn test_append_empty_events_is_noop(pool: PgPool) {
    let repo = PgEventRepository::new(pool);
    let aggregate_id = Uuid::new_v4();

    repo.append_events(aggregate_id, 5, &[]).await.unwrap();

    assert!(repo.load_events(aggregate_id).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires PostgreSQL"]
async fn test_timestamp_survives_at_microsecond_precision(pool: PgPool) {
    let repo = PgEventRepository::new(pool);
    let aggregate_id = Uuid::new_v4();
    let mut event = make_stored_event(aggregate_id, 1);
    event.occurred_at = Utc::now();
    let original = event.occurred_at.timestamp_micros();

    repo.append_events(aggregate_id, 0, &[event]).await.unwrap();

    let loaded = repo.load_events(aggregate_id).await.unwrap();
    assert_eq!(loaded[0].occurred_at.timestamp_micros(), original);
}
