use std::sync::Arc;
use std::time::Duration;

use aide::openapi::{Info, OpenApi};
use axum::{middleware, Extension, Router};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::routes::{self, assets};
use crate::{middleware::cors, object_store::ObjectStore, types::Config};

/// Upper bound on handling a single request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Builds the full application router
///
/// Tokens, environment and object store are fixed here at construction time;
/// handlers receive them as extensions.
#[must_use]
pub fn router(config: &Config, object_store: Arc<dyn ObjectStore>) -> Router {
    let mut openapi = OpenApi {
        info: Info {
            title: "Print Queue".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            ..Info::default()
        },
        ..OpenApi::default()
    };

    let api = routes::handler()
        .finish_api(&mut openapi)
        .layer(Extension(Arc::new(openapi)));

    api.merge(assets::router(&config.static_dir))
        .layer(Extension(config.environment))
        .layer(Extension(config.access_tokens.clone()))
        .layer(Extension(object_store))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(middleware::from_fn(cors))
        // Logs method and URI of every request
        .layer(TraceLayer::new_for_http())
}

/// Starts the server with the given configuration and object store
///
/// # Errors
///
/// Returns an error if the server fails to bind to the port or stops abnormally
pub async fn start(config: Config, object_store: Arc<dyn ObjectStore>) -> anyhow::Result<()> {
    let router = router(&config, object_store);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Starting HTTP server on addr: {addr}");

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(anyhow::Error::from)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutting down");
}
