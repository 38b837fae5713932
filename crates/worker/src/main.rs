//! Standalone scheduler process.
//!
//! Runs only the polling loop against the task store, for deployments where
//! the HTTP server is started with `EMBEDDED_SCHEDULER=false`. Run exactly
//! one scheduler per database.

use resizer_worker::shutdown::shutdown_signal;
use resizer_worker::{Scheduler, SchedulerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "resizer_worker=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = SchedulerConfig::from_env();
    tracing::info!(
        interval_secs = config.interval_secs,
        utc_offset = ?config.utc_offset,
        "Loaded scheduler configuration"
    );

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| resizer_db::DEFAULT_DATABASE_URL.into());

    let pool = resizer_db::create_pool(&database_url)
        .await
        .expect("Failed to open database");
    tracing::info!(%database_url, "Database connection pool created");

    resizer_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    let scheduler = Scheduler::from_config(pool, &config);
    scheduler.start();

    shutdown_signal().await;

    scheduler.stop().await;
    tracing::info!("Worker shut down");
}
