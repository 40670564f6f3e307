//!
//! User registry service: user CRUD, bulk import/export, and consent
//! manager synchronization.
//! Reads configuration from TOML file (~/.config/user-registry/config.toml).

use std::path::PathBuf;
use std::sync::Arc;

use sea_orm_migration::MigratorTrait;
use tracing::{error, info, warn};

use user_registry::application::users::UserDirectoryService;
use user_registry::config::AppConfig;
use user_registry::infrastructure::consent::ConsentHttpClient;
use user_registry::infrastructure::database::migrator::Migrator;
use user_registry::infrastructure::database::repositories::UserRepository;
use user_registry::{create_api_router, default_config_path, init_database, DatabaseConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Load configuration ─────────────────────────────────────
    let config_path = std::env::var("USER_REGISTRY_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| default_config_path());
    let app_cfg = match AppConfig::load(&config_path) {
        Ok(cfg) => {
            // Initialize logging with configured level
            tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cfg.logging.level)),
                )
                .init();
            info!("Configuration loaded from {}", config_path.display());
            cfg
        }
        Err(e) => {
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::new("info"))
                .init();
            error!("Failed to load config: {}. Using defaults.", e);
            AppConfig::default()
        }
    };

    info!("Starting User Registry service...");

    // ── Database ───────────────────────────────────────────────
    let db_config = DatabaseConfig {
        url: app_cfg.database.url.clone(),
    };
    let db = match init_database(&db_config).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            return Err(e.into());
        }
    };

    info!("Running database migrations...");
    if let Err(e) = Migrator::up(&db, None).await {
        error!("Failed to run migrations: {}", e);
        return Err(e.into());
    }
    info!("Migrations completed");

    // ── Consent manager client ─────────────────────────────────
    if !app_cfg.consent.is_configured() {
        warn!("Consent URI is not configured; user creation and bulk import will be rejected");
    }
    let consent = Arc::new(ConsentHttpClient::new(app_cfg.consent.clone())?);

    // ── Service & router ───────────────────────────────────────
    let repo = Arc::new(UserRepository::new(db.clone()));
    let service = Arc::new(UserDirectoryService::new(repo, consent));
    let router = create_api_router(service);

    // ── REST API server with graceful shutdown ─────────────────
    let addr = app_cfg.server.address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("REST API server listening on http://{}", addr);
    info!("Swagger UI available at http://{}/docs/", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Perform final cleanup
    if let Err(e) = db.close().await {
        warn!("Error closing database connection: {}", e);
    } else {
        info!("Database connection closed");
    }

    info!("User Registry shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown signal received");
}
