use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;
use tracing::info;

use crate::config::AppConfig;
use crate::migrator::Migrator;

/// Type alias for a database connection pool
pub type DbPool = DatabaseConnection;

/// Establishes a connection pool using the application configuration.
pub async fn establish_connection_from_app_config(cfg: &AppConfig) -> Result<DbPool, DbErr> {
    establish_connection(
        &cfg.database_url,
        cfg.db_max_connections,
        cfg.db_min_connections,
    )
    .await
}

/// Establishes a connection pool to the database.
pub async fn establish_connection(
    url: &str,
    max_connections: u32,
    min_connections: u32,
) -> Result<DbPool, DbErr> {
    let mut opts = ConnectOptions::new(url.to_owned());
    opts.max_connections(max_connections)
        .min_connections(min_connections)
        .connect_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .acquire_timeout(Duration::from_secs(8))
        .sqlx_logging(false);

    let conn = Database::connect(opts).await?;
    info!("Database connection established");
    Ok(conn)
}

/// Runs all pending migrations.
pub async fn run_migrations(conn: &DbPool) -> Result<(), DbErr> {
    info!("Running database migrations");
    Migrator::up(conn, None).await?;
    info!("Migrations complete");
    Ok(())
}
