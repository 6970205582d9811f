//! S3-compatible object store

use std::collections::HashMap;
use std::time::Duration;

use aws_sdk_s3::{
    error::SdkError,
    operation::head_object::{HeadObjectError, HeadObjectOutput},
    presigning::PresigningConfig,
    primitives::DateTime as S3DateTime,
    types::MetadataDirective,
    Client as S3Client,
};
use chrono::{DateTime, Utc};
use futures::{StreamExt, TryStreamExt};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tracing::{debug, instrument};

use super::{Headers, ObjectAttrs, ObjectStore, PresignedUrl, StorageError, StorageResult};

/// Reserved metadata key holding the original creation time.
///
/// S3 has no in-place metadata update, so rewriting metadata resets `LastModified`.
const CREATED_AT_METADATA_KEY: &str = "created-at";

/// Number of `HeadObject` calls in flight while listing
const LIST_HEAD_CONCURRENCY: usize = 16;

/// Characters escaped in the `x-amz-copy-source` header. Path separators stay intact.
const COPY_SOURCE_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Object store backed by any S3-compatible API
pub struct S3ObjectStore {
    s3_client: S3Client,
    bucket_name: String,
    list_page_size: Option<i32>,
}

impl S3ObjectStore {
    /// Creates a new S3 object store
    ///
    /// # Arguments
    ///
    /// * `s3_client` - Pre-configured S3 client
    /// * `bucket_name` - Bucket holding the uploaded files
    #[must_use]
    pub const fn new(s3_client: S3Client, bucket_name: String) -> Self {
        Self {
            s3_client,
            bucket_name,
            list_page_size: None,
        }
    }

    /// Caps the number of keys fetched per listing page (the backend default otherwise)
    #[must_use]
    pub const fn with_list_page_size(mut self, page_size: i32) -> Self {
        self.list_page_size = Some(page_size);
        self
    }

    async fn head(&self, key: &str) -> StorageResult<Option<HeadObjectOutput>> {
        let result = self
            .s3_client
            .head_object()
            .bucket(&self.bucket_name)
            .key(key)
            .send()
            .await;

        match result {
            Ok(output) => Ok(Some(output)),
            Err(SdkError::ServiceError(service_err))
                if matches!(service_err.err(), HeadObjectError::NotFound(_)) =>
            {
                debug!("Object does not exist: {key}");
                Ok(None)
            }
            Err(e) => Err(StorageError::from(e)),
        }
    }

    fn presigning_config(expires_in: Duration) -> StorageResult<PresigningConfig> {
        PresigningConfig::expires_in(expires_in).map_err(|e| {
            StorageError::ConfigError(format!("Failed to create presigning config: {e}"))
        })
    }
}

fn copy_source(bucket_name: &str, key: &str) -> String {
    format!(
        "{bucket_name}/{}",
        utf8_percent_encode(key, COPY_SOURCE_ESCAPE)
    )
}

fn to_chrono(timestamp: &S3DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(timestamp.secs(), timestamp.subsec_nanos())
}

fn created_at(key: &str, output: &HeadObjectOutput) -> StorageResult<DateTime<Utc>> {
    output
        .metadata()
        .and_then(recorded_created_at)
        .or_else(|| output.last_modified().and_then(to_chrono))
        .ok_or_else(|| StorageError::S3Error(format!("{key} has no timestamp")))
}

fn recorded_created_at(metadata: &HashMap<String, String>) -> Option<DateTime<Utc>> {
    metadata
        .get(CREATED_AT_METADATA_KEY)
        .and_then(|value| DateTime::parse_from_rfc3339(value).ok())
        .map(|created| created.with_timezone(&Utc))
}

#[async_trait::async_trait]
impl ObjectStore for S3ObjectStore {
    #[instrument(skip(self, headers))]
    async fn presign_put(
        &self,
        key: &str,
        headers: &Headers,
        expires_in: Duration,
    ) -> StorageResult<PresignedUrl> {
        let presigning_config = Self::presigning_config(expires_in)?;
        let signed_headers = headers.clone();

        let presigned = self
            .s3_client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key)
            .customize()
            .mutate_request(move |request| {
                for (name, value) in &signed_headers {
                    request.headers_mut().insert(name.clone(), value.clone());
                }
            })
            .presigned(presigning_config)
            .await
            .map_err(|e| StorageError::SigningError(format!("PUT {key}: {e}")))?;

        // The SDK may require headers of its own on top of the ones we asked it to sign
        let mut required = headers.clone();
        for (name, value) in presigned.headers() {
            if !required.keys().any(|k| k.eq_ignore_ascii_case(name)) {
                required.insert(name.to_owned(), value.to_owned());
            }
        }

        debug!("Generated presigned PUT URL for {key}");

        Ok(PresignedUrl {
            url: presigned.uri().to_string(),
            headers: required,
            expires_at: Utc::now() + expires_in,
        })
    }

    async fn presign_get(&self, key: &str, expires_in: Duration) -> StorageResult<PresignedUrl> {
        let presigning_config = Self::presigning_config(expires_in)?;

        let presigned = self
            .s3_client
            .get_object()
            .bucket(&self.bucket_name)
            .key(key)
            .presigned(presigning_config)
            .await
            .map_err(|e| StorageError::SigningError(format!("GET {key}: {e}")))?;

        Ok(PresignedUrl {
            url: presigned.uri().to_string(),
            headers: presigned
                .headers()
                .map(|(name, value)| (name.to_owned(), value.to_owned()))
                .collect(),
            expires_at: Utc::now() + expires_in,
        })
    }

    async fn object_attrs(&self, key: &str) -> StorageResult<Option<ObjectAttrs>> {
        let Some(output) = self.head(key).await? else {
            return Ok(None);
        };

        Ok(Some(ObjectAttrs {
            key: key.to_owned(),
            created: created_at(key, &output)?,
            size: output.content_length().unwrap_or_default(),
            metadata: output.metadata().cloned().unwrap_or_default(),
        }))
    }

    #[instrument(skip(self, metadata))]
    async fn update_metadata(
        &self,
        key: &str,
        mut metadata: HashMap<String, String>,
    ) -> StorageResult<()> {
        let current = self
            .head(key)
            .await?
            .ok_or_else(|| StorageError::NotFound(key.to_owned()))?;

        let created = created_at(key, &current)?;
        metadata
            .entry(CREATED_AT_METADATA_KEY.to_owned())
            .or_insert_with(|| created.to_rfc3339());

        // REPLACE resets every header it is not given
        self.s3_client
            .copy_object()
            .bucket(&self.bucket_name)
            .key(key)
            .copy_source(copy_source(&self.bucket_name, key))
            .metadata_directive(MetadataDirective::Replace)
            .set_metadata(Some(metadata))
            .set_content_type(current.content_type)
            .set_cache_control(current.cache_control)
            .set_content_disposition(current.content_disposition)
            .set_content_encoding(current.content_encoding)
            .set_content_language(current.content_language)
            .send()
            .await?;

        debug!("Updated metadata for {key}");
        Ok(())
    }

    async fn list_objects(&self) -> StorageResult<Vec<ObjectAttrs>> {
        let mut pages = self
            .s3_client
            .list_objects_v2()
            .bucket(&self.bucket_name)
            .set_max_keys(self.list_page_size)
            .into_paginator()
            .send();

        let mut keys = Vec::new();
        while let Some(page) = pages.next().await {
            keys.extend(
                page?
                    .contents()
                    .iter()
                    .filter_map(|object| object.key().map(ToOwned::to_owned)),
            );
        }

        // Listing does not carry user metadata, so every object needs its own HEAD
        let objects: Vec<Option<ObjectAttrs>> = futures::stream::iter(keys)
            .map(|key| async move { self.object_attrs(&key).await })
            .buffer_unordered(LIST_HEAD_CONCURRENCY)
            .try_collect()
            .await?;

        // Objects deleted between the listing and the HEAD are skipped
        Ok(objects.into_iter().flatten().collect())
    }
}
