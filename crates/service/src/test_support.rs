use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

/// Fresh in-memory SQLite database with the full schema applied.
pub async fn sqlite_db() -> Result<DatabaseConnection, anyhow::Error> {
    let db = Database::connect("sqlite::memory:").await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}
