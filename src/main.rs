//! doctree maintenance entry point.
//!
//! Loads configuration, connects to PostgreSQL and checks it answers,
//! applies pending migrations, and runs the startup repair sweep once.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use doctree_core::config::{AppConfig, LogFormat};
use doctree_core::error::{AppError, ErrorKind};
use doctree_database::{DatabasePool, NodeRepository};
use doctree_worker::MigrationSweeper;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Maintenance run failed: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from files and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("DOCTREE_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        LogFormat::Pretty => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting doctree maintenance v{}", env!("CARGO_PKG_VERSION"));

    let db = DatabasePool::connect(&config.database).await?;
    if !db.health_check().await? {
        return Err(AppError::new(
            ErrorKind::Database,
            "Database health check returned an unexpected result",
        ));
    }
    doctree_database::migration::run_migrations(db.pool()).await?;

    if config.sweeper.enabled {
        let node_repo = Arc::new(NodeRepository::new(db.pool().clone()));
        let report = MigrationSweeper::new(node_repo, &config.tree).run().await;
        if !report.is_clean() {
            tracing::warn!(failed = ?report.failed, "Some repair passes failed");
        }
    } else {
        tracing::info!("Migration sweep disabled");
    }

    db.close().await;
    tracing::info!("Maintenance complete");
    Ok(())
}
