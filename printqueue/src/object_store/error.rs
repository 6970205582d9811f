//! Error types for object store operations

use aws_sdk_s3::{
    error::{DisplayErrorContext, SdkError},
    operation::{
        copy_object::CopyObjectError, head_object::HeadObjectError,
        list_objects_v2::ListObjectsV2Error,
    },
};
use thiserror::Error;

/// Result type for object store operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during object store operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// S3 service error
    #[error("S3 service error: {0}")]
    S3Error(String),

    /// AWS SDK error (transport, timeout, construction)
    #[error("AWS SDK error: {0}")]
    AwsError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Object does not exist
    #[error("Object not found: {0}")]
    NotFound(String),

    /// URL signing failed
    #[error("Failed to sign URL: {0}")]
    SigningError(String),
}

impl From<SdkError<HeadObjectError>> for StorageError {
    fn from(error: SdkError<HeadObjectError>) -> Self {
        match error {
            SdkError::ServiceError(err) => Self::S3Error(format!("{:?}", err.err())),
            other => Self::AwsError(DisplayErrorContext(&other).to_string()),
        }
    }
}

impl From<SdkError<CopyObjectError>> for StorageError {
    fn from(error: SdkError<CopyObjectError>) -> Self {
        match error {
            SdkError::ServiceError(err) => Self::S3Error(format!("{:?}", err.err())),
            other => Self::AwsError(DisplayErrorContext(&other).to_string()),
        }
    }
}

impl From<SdkError<ListObjectsV2Error>> for StorageError {
    fn from(error: SdkError<ListObjectsV2Error>) -> Self {
        match error {
            SdkError::ServiceError(err) => Self::S3Error(format!("{:?}", err.err())),
            other => Self::AwsError(DisplayErrorContext(&other).to_string()),
        }
    }
}
