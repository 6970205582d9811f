use std::sync::Arc;

use axum::{
    extract::{Query, Request},
    http::Uri,
    middleware::Next,
    response::Response,
    Extension,
};
use crate::types::AppError;

/// Shared secrets checked against the `access_token` query parameter
///
/// Holders of the upload token may request upload URLs and finish uploads.
/// Holders of the download token may list files.
#[derive(Clone)]
pub struct AccessTokens {
    upload: Arc<str>,
    download: Arc<str>,
}

impl AccessTokens {
    /// Creates the token pair
    #[must_use]
    pub fn new(upload: impl Into<Arc<str>>, download: impl Into<Arc<str>>) -> Self {
        Self {
            upload: upload.into(),
            download: download.into(),
        }
    }

    /// Whether `presented` grants upload access
    #[must_use]
    pub fn upload_matches(&self, presented: Option<&str>) -> bool {
        presented == Some(&*self.upload)
    }

    /// Whether `presented` grants download access
    #[must_use]
    pub fn download_matches(&self, presented: Option<&str>) -> bool {
        presented == Some(&*self.download)
    }
}

// Secrets never reach the logs
impl std::fmt::Debug for AccessTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessTokens").finish_non_exhaustive()
    }
}

/// Extracts the first `access_token` query parameter, if any
fn presented_token(uri: &Uri) -> Option<String> {
    let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(uri).ok()?;

    pairs
        .into_iter()
        .find_map(|(name, value)| (name == "access_token").then_some(value))
}

/// Upload gate middleware
///
/// Rejects the request with `403 Forbidden` before the handler (and therefore any
/// storage call) runs when the upload token does not match.
///
/// # Errors
///
/// - `AppError` - Missing or mismatched token with 403 status code
pub async fn require_upload_token(
    Extension(tokens): Extension<AccessTokens>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !tokens.upload_matches(presented_token(request.uri()).as_deref()) {
        return Err(AppError::forbidden());
    }

    Ok(next.run(request).await)
}

/// Download gate middleware
///
/// Same as [`require_upload_token`] for the download token, rejecting with
/// `401 Unauthorized`.
///
/// # Errors
///
/// - `AppError` - Missing or mismatched token with 401 status code
pub async fn require_download_token(
    Extension(tokens): Extension<AccessTokens>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !tokens.download_matches(presented_token(request.uri()).as_deref()) {
        return Err(AppError::unauthorized());
    }

    Ok(next.run(request).await)
}
