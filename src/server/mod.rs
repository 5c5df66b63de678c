//! Read-only HTTP query service over a build directory.
//!
//! Artifacts are read from disk on every request, so a fresh `aipi build`
//! is visible without restarting the server.

pub mod handlers;

use std::path::PathBuf;
use std::sync::Arc;

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::domain::ServeConfig;
use crate::error::{AppError, EXIT_SERVE};

/// State shared across handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub build_dir: Arc<PathBuf>,
}

impl AppState {
    pub fn new(build_dir: PathBuf) -> Self {
        Self {
            build_dir: Arc::new(build_dir),
        }
    }
}

/// Create the `/v1` router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/health", get(handlers::health))
        .route("/v1/meta", get(handlers::meta))
        .route("/v1/providers", get(handlers::providers))
        .route("/v1/systems", get(handlers::systems))
        .route("/v1/detail", get(handlers::detail))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn run(config: ServeConfig) -> Result<(), AppError> {
    if !config.build_dir.is_dir() {
        tracing::warn!(
            build_dir = %config.build_dir.display(),
            "build directory does not exist yet; endpoints will return 404"
        );
    }

    let listener = TcpListener::bind(&config.bind)
        .await
        .map_err(|e| AppError::new(EXIT_SERVE, format!("Failed to bind {}: {e}", config.bind)))?;

    info!(
        bind = %config.bind,
        build_dir = %config.build_dir.display(),
        "query service listening"
    );

    let app = create_router(AppState::new(config.build_dir));
    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::new(EXIT_SERVE, format!("Server error: {e}")))
}
