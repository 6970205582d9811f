use axum::response::Response;
use http_body_util::BodyExt;

/// Appends the `access_token` query parameter to a route
pub fn with_token(route: &str, token: &str) -> String {
    format!("{route}?access_token={token}")
}

/// Parse response body to JSON
pub async fn parse_response_body(response: Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

/// Read response body as text
pub async fn response_text(response: Response) -> String {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(body.to_vec()).unwrap()
}
