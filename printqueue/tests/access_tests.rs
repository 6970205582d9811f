mod common;

use common::*;

use http::StatusCode;
use serde_json::json;

// Upload gate

#[tokio::test]
async fn test_upload_without_token_is_forbidden() {
    let setup = TestSetup::new();

    let response = setup
        .send_post_request("/api/upload", json!({ "filename": "benchy.stl" }))
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(response_text(response).await, "Forbidden");
    assert_eq!(setup.object_store.calls(), 0);
}

#[tokio::test]
async fn test_upload_with_download_token_is_forbidden() {
    let setup = TestSetup::new();

    let response = setup
        .send_post_request(
            &with_token("/api/upload", DOWN_TOKEN),
            json!({ "filename": "benchy.stl" }),
        )
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(setup.object_store.calls(), 0);
}

#[tokio::test]
async fn test_finish_with_wrong_token_is_forbidden() {
    let setup = TestSetup::new();
    setup.object_store.put_object("abc/benchy.stl", 10).await;

    let response = setup
        .send_post_request(
            &with_token("/api/finish", "guess"),
            json!({ "id": "abc/benchy.stl", "email": "a@b.com" }),
        )
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(setup.object_store.calls(), 0);
    assert!(setup
        .object_store
        .metadata("abc/benchy.stl")
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_gate_runs_before_body_validation() {
    let setup = TestSetup::new();

    // An empty body would be a 400, but the token is checked first
    let response = setup
        .send_post_request("/api/upload?access_token=", json!({}))
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// Download gate

#[tokio::test]
async fn test_files_without_token_is_unauthorized() {
    let setup = TestSetup::new();
    setup.object_store.put_object("abc/benchy.stl", 10).await;

    let response = setup
        .send_get_request("/api/files")
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response_text(response).await, "Unauthorized");
    assert_eq!(setup.object_store.calls(), 0);
}

#[tokio::test]
async fn test_files_with_upload_token_is_unauthorized() {
    let setup = TestSetup::new();

    let response = setup
        .send_get_request(&with_token("/api/files", UP_TOKEN))
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(setup.object_store.calls(), 0);
}

#[tokio::test]
async fn test_uptoken_accepts_download_token() {
    let setup = TestSetup::new();

    let response = setup
        .send_get_request(&with_token("/api/uptoken", DOWN_TOKEN))
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "application/json"
    );
    assert_eq!(parse_response_body(response).await, json!({}));
    assert_eq!(setup.object_store.calls(), 0);
}

#[tokio::test]
async fn test_repeated_token_parameter_uses_first() {
    let setup = TestSetup::new();

    let accepted = setup
        .send_get_request(&format!(
            "{}&access_token=guess",
            with_token("/api/uptoken", DOWN_TOKEN)
        ))
        .await
        .expect("Failed to send request");
    assert_eq!(accepted.status(), StatusCode::OK);

    let rejected = setup
        .send_get_request(&format!(
            "/api/uptoken?access_token=guess&access_token={DOWN_TOKEN}"
        ))
        .await
        .expect("Failed to send request");
    assert_eq!(rejected.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_uptoken_rejects_other_tokens() {
    let setup = TestSetup::new();

    for route in [
        "/api/uptoken".to_string(),
        with_token("/api/uptoken", UP_TOKEN),
        with_token("/api/uptoken", "down-secret-but-longer"),
    ] {
        let response = setup
            .send_get_request(&route)
            .await
            .expect("Failed to send request");

        assert_eq!(
            response.status(),
            StatusCode::UNAUTHORIZED,
            "Failed for route: {route}"
        );
    }
}
