/// Database migration runner
///
/// Thin wrapper over sqlx's embedded migration system. Migration files live
/// in the `migrations/` directory at the workspace root; each is a plain
/// `{version}_{name}.sql` applied once, in order.

use sqlx::postgres::PgPool;
use tracing::{info, warn};

/// Runs all pending database migrations
///
/// Called at server startup, and by the integration test harness, so a
/// fresh database is brought to the current schema before anything touches
/// it.
///
/// # Errors
///
/// Returns an error if a migration file is malformed or fails to execute.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Starting database migrations");

    let migrations = sqlx::migrate!("../migrations");

    match migrations.run(pool).await {
        Ok(()) => {
            info!("All database migrations completed successfully");
            Ok(())
        }
        Err(e) => {
            warn!("Migration failed: {}", e);
            Err(e)
        }
    }
}
