use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::{Json, response::IntoResponse};
use catalog_domain::constants::{INDEX_HTML, METADATA_DIR, SUPER_FILE};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Shared by the health check: what is being served and since when.
#[derive(Debug, Clone)]
pub(super) struct SiteState {
    root: Arc<PathBuf>,
    started: Instant,
}

impl SiteState {
    pub(super) fn new(root: PathBuf) -> Self {
        Self { root: Arc::new(root), started: Instant::now() }
    }
}

#[derive(Debug, Serialize)]
struct SiteHealth {
    /// `up` when the site can be browsed, `degraded` otherwise.
    status: &'static str,
    version: &'static str,
    uptime: u64,
    index: bool,
    metadata: bool,
    super_dataset: bool,
}

/// Reports whether the served directory still looks like a browsable catalog.
pub(super) async fn site_health(State(site): State<SiteState>) -> impl IntoResponse {
    let metadata = site.root.join(METADATA_DIR);
    let body = SiteHealth {
        status: "up",
        version: env!("CARGO_PKG_VERSION"),
        uptime: site.started.elapsed().as_secs(),
        index: site.root.join(INDEX_HTML).is_file(),
        metadata: metadata.is_dir(),
        super_dataset: metadata.join(SUPER_FILE).is_file(),
    };

    let (code, body) = if body.index && body.metadata {
        (StatusCode::OK, body)
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, SiteHealth { status: "degraded", ..body })
    };

    (
        code,
        [
            (header::CACHE_CONTROL, "no-store, no-cache, must-revalidate"),
            (header::PRAGMA, "no-cache"),
        ],
        Json(body),
    )
}
