//! Schema migrations
//!
//! Migrations are plain SQL files read at runtime (`<version>_<name>.sql`),
//! so no compile-time database access is needed.

use std::path::Path;

use sqlx::migrate::{MigrateError, Migrator};
use sqlx::PgPool;
use tracing::info;

/// Apply every pending migration found in `dir`
pub async fn run_migrations(pool: &PgPool, dir: impl AsRef<Path>) -> Result<(), MigrateError> {
    let dir = dir.as_ref();
    let migrator = Migrator::new(dir).await?;
    info!(dir = %dir.display(), migrations = migrator.iter().count(), "Applying migrations");
    migrator.run(pool).await?;
    Ok(())
}
