//! omc-api library - track metadata compliance service
//!
//! Routes:
//! - `GET /health` (public)
//! - `POST /validate` (protected)
//! - `POST /validate/metadata` (protected)

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use omc_common::RuleSet;

pub mod api;
pub mod cli;
pub mod error;
pub mod osu;

use osu::BeatmapFetcher;

/// Request bodies larger than this are rejected before parsing
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Compiled rule tables, read-only after startup
    pub rules: Arc<RuleSet>,
    /// Catalog lookups for `/validate`
    pub fetcher: Arc<dyn BeatmapFetcher>,
    /// Shared secret for protected routes; `None` disables auth
    pub api_secret: Option<String>,
    pub max_ids_per_request: usize,
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Create new application state
    pub fn new(
        rules: Arc<RuleSet>,
        fetcher: Arc<dyn BeatmapFetcher>,
        api_secret: Option<String>,
        max_ids_per_request: usize,
    ) -> Self {
        Self {
            rules,
            fetcher,
            api_secret,
            max_ids_per_request,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::extract::DefaultBodyLimit;
    use axum::middleware;
    use axum::routing::post;
    use tower_http::trace::TraceLayer;

    // Protected routes (require authentication)
    let protected = Router::new()
        .route("/validate", post(api::validate_beatmaps))
        .route("/validate/metadata", post(api::validate_metadata))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ));

    // Public routes (no authentication)
    let public = Router::new().merge(api::health_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
