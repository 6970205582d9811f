//! Object storage operations behind a narrow trait
mod error;
#[cfg(any(test, feature = "test-utils"))]
mod memory;
mod s3;

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use chrono::{DateTime, Utc};

pub use error::{StorageError, StorageResult};
#[cfg(any(test, feature = "test-utils"))]
pub use memory::MemoryObjectStore;
pub use s3::S3ObjectStore;

/// Bucket holding every uploaded file
pub const BUCKET_NAME: &str = "printqueue";

/// Headers a client must send with a presigned request, keyed by header name
pub type Headers = BTreeMap<String, String>;

/// Presigned URL with expiration information
#[derive(Debug, Clone)]
pub struct PresignedUrl {
    /// The presigned URL
    pub url: String,
    /// Headers that were signed into the URL and must accompany the request
    pub headers: Headers,
    /// UTC timestamp when the URL expires
    pub expires_at: DateTime<Utc>,
}

/// Attributes of a stored object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectAttrs {
    /// Object key within the bucket
    pub key: String,
    /// When the object was first written
    pub created: DateTime<Utc>,
    /// Size in bytes
    pub size: i64,
    /// User-defined metadata
    pub metadata: HashMap<String, String>,
}

/// Capabilities the API needs from an object store
///
/// Every operation targets the single bucket the store was built for.
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// Signs a PUT request for `key`, binding `headers` into the signature
    ///
    /// # Errors
    ///
    /// Returns `StorageError::SigningError` when the URL cannot be signed
    async fn presign_put(
        &self,
        key: &str,
        headers: &Headers,
        expires_in: Duration,
    ) -> StorageResult<PresignedUrl>;

    /// Signs a GET request for `key`
    ///
    /// # Errors
    ///
    /// Returns `StorageError::SigningError` when the URL cannot be signed
    async fn presign_get(&self, key: &str, expires_in: Duration) -> StorageResult<PresignedUrl>;

    /// Fetches object attributes, returning `Ok(None)` when the object does not exist
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails
    async fn object_attrs(&self, key: &str) -> StorageResult<Option<ObjectAttrs>>;

    /// Replaces the user-defined metadata of an existing object
    ///
    /// Creation time and standard HTTP headers of the object are kept.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the object does not exist, or an error
    /// if the backend request fails
    async fn update_metadata(
        &self,
        key: &str,
        metadata: HashMap<String, String>,
    ) -> StorageResult<()>;

    /// Lists every object in the bucket
    ///
    /// # Errors
    ///
    /// Returns an error if any listing or attribute request fails
    async fn list_objects(&self) -> StorageResult<Vec<ObjectAttrs>>;
}
