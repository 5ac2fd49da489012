use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

use prestaci_api::app;
use prestaci_api::config::Config;
use prestaci_api::jobs::{JobScheduler, NotificationOutboxJob, DatabaseMetricsJob};
use prestaci_api::middleware::{init_metrics, logging::init_logging};
use prestaci_api::services::PgNotificationService;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::load().context("Failed to load configuration")?;

    init_logging(&config.logging).context("Failed to initialize logging")?;
    init_metrics().context("Failed to install metrics recorder")?;

    info!("Starting PrestaCI API v{}", env!("CARGO_PKG_VERSION"));

    let db_config = persistence::db::DatabaseConfig::from(&config.database);
    let pool = persistence::db::create_pool(&db_config)
        .await
        .context("Failed to connect to database")?;

    info!("Running database migrations...");
    sqlx::migrate!("../persistence/src/migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    info!("Migrations completed");

    let mut scheduler = JobScheduler::new();
    scheduler.register(DatabaseMetricsJob::new(pool.clone()));
    scheduler.register(NotificationOutboxJob::new(
        pool.clone(),
        Arc::new(PgNotificationService::new(pool.clone())),
        &config.notifications,
    ));
    scheduler.start();

    let addr = config.socket_addr()?;
    let app = app::create_app(config, pool).context("Failed to build application")?;

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown();
    scheduler.wait_for_shutdown(Duration::from_secs(10)).await;
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
