//! `db` subcommands. All of them read `DATABASE_URL` and pool settings
//! from the environment.

use std::path::Path;

use sqlx::PgPool;

async fn connect() -> anyhow::Result<(tourdesk_core::AppConfig, PgPool)> {
    let config = tourdesk_core::load_app_config()?;
    let pool_config = tourdesk_db::PoolConfig::from_app_config(&config);
    let pool = tourdesk_db::connect_pool(&config.database_url, pool_config).await?;
    Ok((config, pool))
}

/// # Errors
///
/// Returns an error if config is invalid or the database cannot be reached.
pub(crate) async fn run_db_ping() -> anyhow::Result<()> {
    let (_, pool) = connect().await?;
    tourdesk_db::health_check(&pool).await?;
    println!("database ok");
    Ok(())
}

/// # Errors
///
/// Returns an error if config is invalid or any migration fails.
pub(crate) async fn run_db_migrate() -> anyhow::Result<()> {
    let (_, pool) = connect().await?;
    let applied = tourdesk_db::run_migrations(&pool).await?;
    tracing::info!(applied, "migrations complete");
    println!("applied {applied} migration(s)");
    Ok(())
}

/// Load the catalog and upsert it in one transaction.
///
/// # Errors
///
/// Returns an error if the catalog is invalid or the upsert fails.
pub(crate) async fn run_db_seed(catalog_override: Option<&Path>) -> anyhow::Result<()> {
    let (config, pool) = connect().await?;
    let path = catalog_override.unwrap_or(&config.catalog_path);

    let catalog = tourdesk_core::load_catalog(path)?;
    let summary = tourdesk_db::seed_catalog(&pool, &catalog).await?;

    tracing::info!(
        path = %path.display(),
        locations = summary.locations,
        routes = summary.routes,
        "catalog seeded"
    );
    println!(
        "seeded {} location(s) and {} route(s) from {}",
        summary.locations,
        summary.routes,
        path.display()
    );
    Ok(())
}
