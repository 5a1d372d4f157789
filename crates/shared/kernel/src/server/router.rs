use super::health::{self, SiteState};
use axum::Router;
use axum::routing::get;
use std::path::Path;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub const HEALTH_PATH: &str = "/health";

/// Static site router: every path is served from `root` (directories fall back
/// to their `index.html`), plus a health check.
pub fn site_router(root: &Path) -> Router {
    Router::new()
        .route(HEALTH_PATH, get(health::site_health))
        .fallback_service(ServeDir::new(root).append_index_html_on_directories(true))
        .with_state(SiteState::new(root.to_path_buf()))
        .layer(TraceLayer::new_for_http())
}
