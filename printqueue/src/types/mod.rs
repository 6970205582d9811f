mod config;
mod environment;
mod error;
mod extractors;

pub use config::{Config, ConfigError, DEFAULT_PORT, DEFAULT_STATIC_DIR};
pub use environment::Environment;
pub use error::AppError;
pub use extractors::{nullable_string, ValidatedJson};
