use axum::Json;

use super::EmptyResponse;

/// Confirms the download token
///
/// The download gate has already accepted the token by the time this runs.
#[allow(clippy::unused_async)]
pub async fn check_token() -> Json<EmptyResponse> {
    Json(EmptyResponse {})
}
