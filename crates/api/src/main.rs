use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use staywatch_api::auth::revocation::RedisRevocationStore;
use staywatch_api::auth::tokens::TokenService;
use staywatch_api::config::ServerConfig;
use staywatch_api::rate_limit::LoginRateLimiter;
use staywatch_api::router::build_app_router;
use staywatch_api::state::AppState;
use staywatch_api::tasks::LogMailer;
use staywatch_db::Stores;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "staywatch_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env().inspect_err(|e| {
        tracing::error!(error = %e, "Invalid configuration");
    })?;
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let pool = staywatch_db::create_pool(
        &config.database_url,
        Duration::from_secs(config.store_timeout_secs),
    )
    .await?;
    tracing::info!("Database connection pool created");

    staywatch_db::health_check(&pool).await?;
    tracing::info!("Database health check passed");

    staywatch_db::run_migrations(&pool).await?;
    tracing::info!("Database migrations applied");

    // --- Revocation list ---
    let revocations = RedisRevocationStore::connect(
        &config.redis_url,
        Duration::from_secs(config.revocation_timeout_secs),
    )
    .await?;
    tracing::info!("Revocation store connected");

    // --- App state ---
    let state = AppState {
        stores: Stores::postgres(pool),
        config: Arc::new(config.clone()),
        tokens: Arc::new(TokenService::new(config.jwt.clone(), Arc::new(revocations))),
        login_limiter: Arc::new(LoginRateLimiter::new(config.login_rate_limit)),
        mailer: Arc::new(LogMailer),
    };

    let app = build_app_router(state, &config)?;

    // --- Start server ---
    let addr = SocketAddr::new(config.host.parse()?, config.port);
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl-C, shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
