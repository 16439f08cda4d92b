pub mod health;
pub mod merge;

pub use health::*;
pub use merge::*;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::middleware::request_id_middleware;
use crate::services::{CommandRunner, MergePipeline, SystemCommandRunner};

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pipeline: MergePipeline,
}

impl AppState {
    pub fn new(config: Config, runner: Arc<dyn CommandRunner>) -> Self {
        let pipeline = MergePipeline::new(&config, runner);
        Self {
            config: Arc::new(config),
            pipeline,
        }
    }

    /// State backed by real external tools.
    pub fn from_config(config: Config) -> Self {
        let runner = Arc::new(SystemCommandRunner::new(config.command_timeout()));
        Self::new(config, runner)
    }
}

pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes();

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/merge", post(merge_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(body_limit))
                .layer(axum::middleware::from_fn(request_id_middleware)),
        )
        .with_state(state)
}
