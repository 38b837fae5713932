use std::net::SocketAddr;
use std::sync::Arc;

use resizer_core::project_dirs::ProjectDirectories;
use resizer_worker::shutdown::shutdown_signal;
use resizer_worker::Scheduler;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use resizer_api::auth;
use resizer_api::config::ServerConfig;
use resizer_api::router::build_app_router;
use resizer_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "resizer_api=debug,resizer_worker=debug,resizer_db=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        projects_dir = %config.projects_dir.display(),
        embedded_scheduler = config.embedded_scheduler,
        "Loaded server configuration"
    );

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| resizer_db::DEFAULT_DATABASE_URL.into());

    let pool = resizer_db::create_pool(&database_url)
        .await
        .expect("Failed to open database");
    tracing::info!(%database_url, "Database connection pool created");

    resizer_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    resizer_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Initial account ---
    match auth::seed_admin(&pool, &config.admin_username, &config.admin_password).await {
        Ok(true) => tracing::info!(username = %config.admin_username, "Initial account created"),
        Ok(false) => {}
        Err(e) => tracing::warn!(error = %e, "Could not create the initial account"),
    }

    // --- Projects directory ---
    std::fs::create_dir_all(&config.projects_dir).unwrap_or_else(|e| {
        panic!(
            "Failed to create projects directory {}: {e}",
            config.projects_dir.display()
        )
    });

    // --- Scheduler ---
    let scheduler = config
        .embedded_scheduler
        .then(|| Arc::new(Scheduler::from_config(pool.clone(), &config.scheduler)));
    if let Some(scheduler) = &scheduler {
        scheduler.start();
    } else {
        tracing::info!("Embedded scheduler disabled; run resizer-worker separately");
    }

    // --- App state ---
    let state = AppState {
        pool,
        project_dirs: Arc::new(ProjectDirectories::new(config.projects_dir.clone())),
        clock: Arc::new(config.scheduler.clock()),
        scheduler: scheduler.clone(),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    if let Some(scheduler) = scheduler {
        scheduler.stop().await;
    }

    tracing::info!("Graceful shutdown complete");
}
