//! In-memory object store for tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{
    Headers, ObjectAttrs, ObjectStore, PresignedUrl, StorageError, StorageResult, BUCKET_NAME,
};

/// Object store that keeps attributes in memory and signs nothing
///
/// A client PUT against a presigned URL is simulated with [`MemoryObjectStore::put_object`].
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: RwLock<HashMap<String, ObjectAttrs>>,
    calls: AtomicUsize,
    fail_signing: AtomicBool,
}

impl MemoryObjectStore {
    /// Creates an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an object as if a client had completed its PUT just now
    pub async fn put_object(&self, key: &str, size: i64) {
        self.put_object_at(key, size, Utc::now()).await;
    }

    /// Stores an object with an explicit creation time
    pub async fn put_object_at(&self, key: &str, size: i64, created: DateTime<Utc>) {
        self.objects.write().await.insert(
            key.to_owned(),
            ObjectAttrs {
                key: key.to_owned(),
                created,
                size,
                metadata: HashMap::new(),
            },
        );
    }

    /// Returns the metadata of a stored object
    pub async fn metadata(&self, key: &str) -> Option<HashMap<String, String>> {
        self.objects
            .read()
            .await
            .get(key)
            .map(|object| object.metadata.clone())
    }

    /// Number of trait calls served so far
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Makes every subsequent signing call fail
    pub fn fail_signing(&self, fail: bool) {
        self.fail_signing.store(fail, Ordering::SeqCst);
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn sign(
        &self,
        method: &str,
        key: &str,
        headers: Headers,
        expires_in: Duration,
    ) -> StorageResult<PresignedUrl> {
        if self.fail_signing.load(Ordering::SeqCst) {
            return Err(StorageError::SigningError(format!("{method} {key}: disabled")));
        }

        Ok(PresignedUrl {
            url: format!(
                "https://storage.invalid/{BUCKET_NAME}/{key}?method={method}&expires={}",
                expires_in.as_secs()
            ),
            headers,
            expires_at: Utc::now() + expires_in,
        })
    }
}

#[async_trait::async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn presign_put(
        &self,
        key: &str,
        headers: &Headers,
        expires_in: Duration,
    ) -> StorageResult<PresignedUrl> {
        self.record_call();
        self.sign("PUT", key, headers.clone(), expires_in)
    }

    async fn presign_get(&self, key: &str, expires_in: Duration) -> StorageResult<PresignedUrl> {
        self.record_call();
        self.sign("GET", key, Headers::new(), expires_in)
    }

    async fn object_attrs(&self, key: &str) -> StorageResult<Option<ObjectAttrs>> {
        self.record_call();
        Ok(self.objects.read().await.get(key).cloned())
    }

    async fn update_metadata(
        &self,
        key: &str,
        metadata: HashMap<String, String>,
    ) -> StorageResult<()> {
        self.record_call();
        self.objects
            .write()
            .await
            .get_mut(key)
            .ok_or_else(|| StorageError::NotFound(key.to_owned()))?
            .metadata = metadata;
        Ok(())
    }

    async fn list_objects(&self) -> StorageResult<Vec<ObjectAttrs>> {
        self.record_call();
        Ok(self.objects.read().await.values().cloned().collect())
    }
}
