/// Web UI assets
pub mod assets;
mod docs;
/// File listing
pub mod files;
/// Download token check
pub mod token;
/// Upload URL issuing and finalizing
pub mod uploads;

use aide::axum::{
    routing::{get, post},
    ApiRouter,
};
use axum::middleware;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::middleware::{require_download_token, require_upload_token};

/// Empty JSON object returned by endpoints that only signal success
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct EmptyResponse {}

/// Creates the API router with every gated route
///
/// Each route group carries its own gate, so a bad token is rejected before
/// the body is read or the object store is touched.
#[must_use]
pub fn handler() -> ApiRouter {
    let upload_routes = ApiRouter::new()
        .api_route("/api/upload", post(uploads::create_upload_url))
        .api_route("/api/finish", post(uploads::finish_upload))
        .layer(middleware::from_fn(require_upload_token));

    let download_routes = ApiRouter::new()
        .api_route("/api/uptoken", get(token::check_token))
        .api_route("/api/files", get(files::list_files))
        .layer(middleware::from_fn(require_download_token));

    ApiRouter::new()
        .merge(docs::handler())
        .merge(upload_routes)
        .merge(download_routes)
}
