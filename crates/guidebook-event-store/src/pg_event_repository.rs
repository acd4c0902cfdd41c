//! `PostgreSQL` implementation of the `EventRepository` trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, warn};
use uuid::Uuid;

use guidebook_core::error::DomainError;
use guidebook_core::repository::{EventRepository, StoredEvent};

type EventRow = (
    Uuid,
    Uuid,
    String,
    serde_json::Value,
    i64,
    Uuid,
    Uuid,
    DateTime<Utc>,
);

/// PostgreSQL-backed event repository.
#[derive(Debug, Clone)]
pub struct PgEventRepository {
    pool: PgPool,
}

impl PgEventRepository {
    /// Creates a new `PgEventRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn infrastructure(error: &sqlx::Error) -> DomainError {
    DomainError::Infrastructure(format!("event store: {error}"))
}

async fn current_version(
    tx: &mut Transaction<'_, Postgres>,
    aggregate_id: Uuid,
) -> Result<i64, sqlx::Error> {
    let (version,): (i64,) = sqlx::query_as(
        "SELECT COALESCE(MAX(sequence_number), 0) FROM domain_events WHERE aggregate_id = $1",
    )
    .bind(aggregate_id)
    .fetch_one(&mut **tx)
    .await?;
    Ok(version)
}

#[async_trait]
impl EventRepository for PgEventRepository {
    async fn load_events(&self, aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        let rows: Vec<EventRow> = sqlx::query_as(
            "SELECT event_id, aggregate_id, event_type, payload, sequence_number, \
                    correlation_id, causation_id, occurred_at \
             FROM domain_events \
             WHERE aggregate_id = $1 \
             ORDER BY sequence_number ASC",
        )
        .bind(aggregate_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| infrastructure(&e))?;

        debug!(%aggregate_id, count = rows.len(), "loaded events");

        Ok(rows
            .into_iter()
            .map(
                |(
                    event_id,
                    aggregate_id,
                    event_type,
                    payload,
                    sequence_number,
                    correlation_id,
                    causation_id,
                    occurred_at,
                )| StoredEvent {
                    event_id,
                    aggregate_id,
                    event_type,
                    payload,
                    sequence_number,
                    correlation_id,
                    causation_id,
                    occurred_at,
                },
            )
            .collect())
    }

    async fn append_events(
        &self,
        aggregate_id: Uuid,
        expected_version: i64,
        events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        if events.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await.map_err(|e| infrastructure(&e))?;

        let actual = current_version(&mut tx, aggregate_id)
            .await
            .map_err(|e| infrastructure(&e))?;
        if actual != expected_version {
            warn!(%aggregate_id, expected_version, actual, "stale campaign stream");
            return Err(DomainError::ConcurrencyConflict {
                aggregate_id,
                expected: expected_version,
                actual,
            });
        }

        for event in events {
            let inserted = sqlx::query(
                "INSERT INTO domain_events \
                     (event_id, aggregate_id, event_type, payload, sequence_number, \
                      correlation_id, causation_id, occurred_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            )
            .bind(event.event_id)
            .bind(aggregate_id)
            .bind(&event.event_type)
            .bind(&event.payload)
            .bind(event.sequence_number)
            .bind(event.correlation_id)
            .bind(event.causation_id)
            .bind(event.occurred_at)
            .execute(&mut *tx)
            .await;

            if let Err(error) = inserted {
                // A concurrent writer passed the version check first and took
                // the same sequence number.
                let unique_violation = error
                    .as_database_error()
                    .is_some_and(|db| db.is_unique_violation());
                if unique_violation {
                    return Err(DomainError::ConcurrencyConflict {
                        aggregate_id,
                        expected: expected_version,
                        actual: expected_version + 1,
                    });
                }
                return Err(infrastructure(&error));
            }
        }

        tx.commit().await.map_err(|e| infrastructure(&e))?;
        debug!(%aggregate_id, count = events.len(), "appended events");
        Ok(())
    }
}
