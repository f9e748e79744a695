//! Murmur server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use murmur_api::{AppState, app};
use murmur_common::Config;
use murmur_core::{DualWrite, JwtTokenService, SharedTokenService};
use murmur_db::{
    MemoryStore,
    repositories::{CommentRepository, PostRepository, UserRepository},
};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
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
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

/// Build the application state on the configured store.
async fn build_state(config: &Config) -> Result<AppState, Box<dyn std::error::Error>> {
    let tokens: SharedTokenService = Arc::new(JwtTokenService::from_config(&config.auth));
    let dual_write = DualWrite::from_config(&config.consistency);

    if config.database.is_in_memory() {
        warn!("Using the in-memory store; data is lost on shutdown");
        let store = MemoryStore::new();
        return Ok(AppState::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store),
            tokens,
            dual_write,
        ));
    }

    let db = murmur_db::init(config).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    murmur_db::migrate(&db).await?;
    info!("Migrations completed");

    let db = Arc::new(db);
    Ok(AppState::new(
        Arc::new(UserRepository::new(Arc::clone(&db))),
        Arc::new(PostRepository::new(Arc::clone(&db))),
        Arc::new(CommentRepository::new(db)),
        tokens,
        dual_write,
    ))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "murmur=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting murmur server...");

    let config = Config::load()?;
    if config.auth.jwt_secret.is_empty() {
        return Err("auth.jwt_secret must not be empty".into());
    }

    let state = build_state(&config).await?;
    let app = app(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
