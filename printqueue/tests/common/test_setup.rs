use std::sync::Arc;

use axum::{body::Body, http::Request, response::Response, Router};
use printqueue::{
    middleware::AccessTokens,
    object_store::MemoryObjectStore,
    server,
    types::{Config, Environment, DEFAULT_PORT},
};
use tempfile::TempDir;
use tower::ServiceExt;

use super::utils::{parse_response_body, with_token};

/// Upload token configured for every test router
pub const UP_TOKEN: &str = "up-secret";

/// Download token configured for every test router
pub const DOWN_TOKEN: &str = "down-secret";

/// Contents of the fake UI entry point
pub const INDEX_HTML: &str = "<!doctype html><title>print queue</title>";

/// Initialize tracing for tests
pub fn setup_test_env() {
    // LocalStack credentials and region
    dotenvy::from_path(".env.example").ok();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init()
        .ok();
}

/// Router wired to an in-memory object store and a temporary UI directory
pub struct TestSetup {
    pub router: Router,
    pub object_store: Arc<MemoryObjectStore>,
    // Keep the static directory alive for the duration of the test
    _static_dir: TempDir,
}

impl TestSetup {
    pub fn new() -> Self {
        setup_test_env();

        let static_dir = tempfile::tempdir().expect("Failed to create static dir");
        std::fs::write(static_dir.path().join("index.html"), INDEX_HTML).unwrap();
        std::fs::write(static_dir.path().join("manifest.json"), r#"{"name":"printqueue"}"#)
            .unwrap();
        std::fs::create_dir_all(static_dir.path().join("static/js")).unwrap();
        std::fs::write(
            static_dir.path().join("static/js/main.js"),
            "console.log('upload');",
        )
        .unwrap();

        let config = Config {
            environment: Environment::Development,
            port: DEFAULT_PORT,
            access_tokens: AccessTokens::new(UP_TOKEN, DOWN_TOKEN),
            static_dir: static_dir.path().to_path_buf(),
            storage_endpoint: None,
        };

        let object_store = Arc::new(MemoryObjectStore::new());
        let router = server::router(&config, object_store.clone());

        Self {
            router,
            object_store,
            _static_dir: static_dir,
        }
    }

    pub async fn send_request(
        &self,
        request: Request<Body>,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }

    pub async fn send_post_request(
        &self,
        route: &str,
        payload: serde_json::Value,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let request = Request::builder()
            .uri(route)
            .method("POST")
            .header("Content-Type", "application/json")
            .body(Body::from(payload.to_string()))?;

        self.send_request(request).await
    }

    pub async fn send_get_request(
        &self,
        route: &str,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let request = Request::builder()
            .uri(route)
            .method("GET")
            .body(Body::empty())?;

        self.send_request(request).await
    }

    /// Requests an upload URL for `filename` and returns the issued object key
    pub async fn issue_upload(&self, filename: &str) -> String {
        let response = self
            .send_post_request(
                &with_token("/api/upload", UP_TOKEN),
                serde_json::json!({ "filename": filename }),
            )
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), http::StatusCode::OK);

        let body = parse_response_body(response).await;
        body["id"].as_str().unwrap().to_string()
    }

    /// Records `email` as the uploader of `id`
    pub async fn finish_upload(&self, id: &str, email: &str) -> Response {
        self.send_post_request(
            &with_token("/api/finish", UP_TOKEN),
            serde_json::json!({ "id": id, "email": email }),
        )
        .await
        .expect("Failed to send request")
    }
}
