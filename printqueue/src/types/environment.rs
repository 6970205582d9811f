//! Environment configuration for different deployment stages

use std::env;
use std::time::Duration;

use aws_config::{retry::RetryConfig, timeout::TimeoutConfig, BehaviorVersion};

use super::config::ConfigError;

/// Per-operation bound on storage calls, matching the request timeout
const STORAGE_OPERATION_TIMEOUT: Duration = Duration::from_secs(15);

/// GCS interoperability endpoint (S3-compatible XML API)
pub const GCS_ENDPOINT: &str = "https://storage.googleapis.com";

/// `LocalStack` edge endpoint used during development
pub const LOCALSTACK_ENDPOINT: &str = "http://localhost:4566";

/// Application environment configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Production environment
    Production,
    /// Development environment (uses `LocalStack`)
    Development,
}

impl Environment {
    /// Creates an Environment from the `APP_ENV` environment variable
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvironment` if `APP_ENV` contains an unknown value
    pub fn from_env() -> Result<Self, ConfigError> {
        let env = env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .trim()
            .to_lowercase();

        match env.as_str() {
            "production" => Ok(Self::Production),
            "development" => Ok(Self::Development),
            _ => Err(ConfigError::InvalidEnvironment(env)),
        }
    }

    /// Whether logs should be emitted as JSON
    #[must_use]
    pub const fn json_logs(self) -> bool {
        matches!(self, Self::Production)
    }

    /// Whether to show API docs
    #[must_use]
    pub const fn show_api_docs(self) -> bool {
        matches!(self, Self::Development)
    }

    /// Default object store endpoint
    ///
    /// Production targets the GCS interoperability API, the only backend that enforces
    /// the signed `X-Goog-Content-Length-Range` upload limit.
    #[must_use]
    pub const fn default_storage_endpoint(self) -> &'static str {
        match self {
            Self::Production => GCS_ENDPOINT,
            Self::Development => LOCALSTACK_ENDPOINT,
        }
    }

    /// Endpoint the object store client talks to, `endpoint_override` winning over the default
    #[must_use]
    pub fn storage_endpoint(self, endpoint_override: Option<&str>) -> &str {
        endpoint_override.unwrap_or(self.default_storage_endpoint())
    }

    /// AWS configuration with retries disabled and a bounded operation timeout
    ///
    /// Storage failures are reported to the caller immediately, so the SDK must not retry.
    pub async fn aws_config(self) -> aws_config::SdkConfig {
        let timeout_config = TimeoutConfig::builder()
            .operation_timeout(STORAGE_OPERATION_TIMEOUT)
            .build();

        aws_config::load_defaults(BehaviorVersion::latest())
            .await
            .to_builder()
            .retry_config(RetryConfig::disabled())
            .timeout_config(timeout_config)
            .build()
    }

    /// S3 service configuration
    ///
    /// Every endpoint is addressed path-style, which `LocalStack` and the GCS
    /// interoperability API both accept.
    pub async fn s3_client_config(self, endpoint_override: Option<&str>) -> aws_sdk_s3::Config {
        let aws_config = self.aws_config().await;
        let s3_config: aws_sdk_s3::Config = (&aws_config).into();

        s3_config
            .to_builder()
            .endpoint_url(self.storage_endpoint(endpoint_override))
            .force_path_style(true)
            .build()
    }
}
