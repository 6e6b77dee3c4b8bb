use sqlx::{migrate::MigrateError, PgPool};
use tracing::info;

/// Bring the database schema up to date.
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await?;

    info!("Database migrations complete.");

    Ok(())
}
