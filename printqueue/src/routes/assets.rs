use std::path::Path;

use axum::Router;
use tower_http::services::{ServeDir, ServeFile};

/// Serves the built web UI
///
/// `/` (upload page) and `/lab` (download page) both load `index.html`; the
/// single-page app picks the view. `/{file}` and `/static/*` map directly onto
/// `static_dir`.
#[must_use]
pub fn router(static_dir: &Path) -> Router {
    let index = static_dir.join("index.html");

    Router::new()
        .route_service("/", ServeFile::new(&index))
        .route_service("/lab", ServeFile::new(&index))
        .nest_service("/static", ServeDir::new(static_dir.join("static")))
        .route_service("/{file}", ServeDir::new(static_dir))
}
