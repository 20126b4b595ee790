use crate::config::DatabaseConfig;
use crate::error::AppResult;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;

pub async fn create_pool(config: &DatabaseConfig) -> AppResult<DatabaseConnection> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    let pool = Database::connect(options).await?;

    Ok(pool)
}

pub async fn run_migrations(pool: &DatabaseConnection) -> AppResult<()> {
    Migrator::up(pool, None).await?;
    Ok(())
}
