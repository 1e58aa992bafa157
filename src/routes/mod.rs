//! API Routes
//!
//! - `/api/generate-query` - free text to PubMed query
//! - `/api/search`, `/api/fetch-papers`, `/api/check-free`, `/api/related-papers` - PubMed passthrough
//! - `/api/generate-summary` - per-article AI summary
//! - `/api/health` - health check
//! - `/` - static frontend

pub mod health;
pub mod papers;
pub mod query;
pub mod static_files;
pub mod summary;

use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::middleware::apply_cors;
use crate::models::AppState;

/// Create the main application router
///
/// API routes take precedence; anything else falls through to the static
/// directory.
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    let api_router = Router::new()
        .merge(query::router(state.clone()))
        .merge(papers::router(state.clone()))
        .merge(summary::router(state.clone()))
        .merge(health::router(state.clone()));

    let router = Router::new()
        .merge(api_router)
        .merge(static_files::router(&state.config.server.static_dir))
        .layer(TraceLayer::new_for_http());

    apply_cors(router, &state.config.server.cors_allowed_origins)
}
