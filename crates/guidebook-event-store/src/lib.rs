//! Guidebook Event Store: PostgreSQL persistence for campaign streams.

pub mod pg_event_repository;

/// Migrations for the `domain_events` table.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");
