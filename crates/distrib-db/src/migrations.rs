//! # Database Migrations
//!
//! SQL files under `migrations/sqlite/` are embedded at compile time and
//! applied in filename order on startup.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Database::new                                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Check _sqlx_migrations  ──►  001_initial_schema.sql ✓                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Run pending, record checksum                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Never edit an applied migration; add a new `NNN_description.sql` instead.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Runs all pending database migrations. Idempotent.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    info!("Checking for pending migrations");

    MIGRATOR.run(pool).await?;

    info!("All migrations applied successfully");
    Ok(())
}

/// Returns `(total, applied)` migration counts for diagnostics.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let total = MIGRATOR.migrations.len();

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(pool)
        .await?;

    Ok((total, usize::try_from(applied).unwrap_or(0)))
}
