//! Database migration runner.

use sqlx::PgPool;
use tracing::info;

use doctree_core::error::{AppError, ErrorKind};

/// Run all pending schema migrations for the `docs` table.
///
/// Safe to call from several processes at once; sqlx serializes migration
/// runs with an advisory lock.
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    info!("Running database migrations...");

    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Failed to run migrations: {e}"),
                e,
            )
        })?;

    info!("Database migrations completed successfully");
    Ok(())
}
