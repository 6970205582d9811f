use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use clap::{CommandFactory, Parser};
use tracing_subscriber::{fmt, EnvFilter};

use printqueue::{
    object_store::{ObjectStore, S3ObjectStore, BUCKET_NAME},
    server,
    types::{Config, Environment},
};

#[derive(Debug, Parser)]
#[command(name = "printqueue", version, about = "Upload gateway for the print queue")]
struct Cli {
    /// Start the printqueue service
    #[arg(long)]
    serve: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if !cli.serve {
        Cli::command().print_help()?;
        return Ok(());
    }

    dotenvy::dotenv().ok();
    let environment = Environment::from_env()?;

    // JSON logs in production, human-readable otherwise
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));
    if environment.json_logs() {
        fmt().json().with_env_filter(env_filter).init();
    } else {
        fmt().with_env_filter(env_filter).init();
    }

    let config = Config::from_env()?;

    let s3_config = environment
        .s3_client_config(config.storage_endpoint.as_deref())
        .await;
    let object_store: Arc<dyn ObjectStore> = Arc::new(S3ObjectStore::new(
        S3Client::from_conf(s3_config),
        BUCKET_NAME.to_string(),
    ));

    server::start(config, object_store).await
}
