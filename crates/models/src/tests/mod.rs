
use anyhow::Result;
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

/// Fresh SQLite database with every migration applied.
pub(crate) async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:").await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}
