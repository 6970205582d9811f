use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::{Extension, Json};
use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::uploads::UPLOADER_METADATA_KEY;
use crate::{
    object_store::{ObjectAttrs, ObjectStore},
    types::AppError,
};

/// Lifetime of a signed download link
pub const DOWNLOAD_URL_EXPIRY: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Uploader shown for objects nobody claimed
pub const ANONYMOUS_UPLOADER: &str = "anonymous";

/// One stored file
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    /// Original filename (last path segment of the object key)
    pub name: String,
    /// Signed GET URL, valid for seven days
    pub download_link: String,
    /// When the object was created
    pub created: DateTime<Utc>,
    /// Email recorded by `/api/finish`, or `anonymous`
    pub uploader: String,
}

/// Body of `GET /api/files`
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ListFilesResponse {
    /// Every stored file, newest first
    pub files: Vec<FileInfo>,
}

/// Display name of an object: the part of the key after the last `/`
#[must_use]
pub fn display_name(key: &str) -> &str {
    key.rsplit_once('/').map_or(key, |(_, name)| name)
}

/// Uploader recorded in `metadata`, falling back to [`ANONYMOUS_UPLOADER`]
fn uploader_of(metadata: &HashMap<String, String>) -> &str {
    metadata
        .get(UPLOADER_METADATA_KEY)
        .filter(|uploader| !uploader.is_empty())
        .map_or(ANONYMOUS_UPLOADER, String::as_str)
}

async fn describe(
    object_store: &dyn ObjectStore,
    object: ObjectAttrs,
) -> Result<FileInfo, AppError> {
    let download = object_store
        .presign_get(&object.key, DOWNLOAD_URL_EXPIRY)
        .await?;

    Ok(FileInfo {
        name: display_name(&object.key).to_owned(),
        download_link: download.url,
        created: object.created,
        uploader: uploader_of(&object.metadata).to_owned(),
    })
}

/// Lists every stored file with a fresh download link
///
/// A single signing failure fails the whole listing; partial results are never returned.
///
/// # Errors
///
/// - `500 INTERNAL_SERVER_ERROR` - Listing or URL signing failed
#[instrument(skip(object_store))]
pub async fn list_files(
    Extension(object_store): Extension<Arc<dyn ObjectStore>>,
) -> Result<Json<ListFilesResponse>, AppError> {
    let objects = object_store.list_objects().await?;

    let mut files = try_join_all(
        objects
            .into_iter()
            .map(|object| describe(object_store.as_ref(), object)),
    )
    .await?;

    files.sort_by(|a, b| b.created.cmp(&a.created));

    tracing::debug!("Listed {} files", files.len());

    Ok(Json(ListFilesResponse { files }))
}
