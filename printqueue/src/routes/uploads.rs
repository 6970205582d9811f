use std::sync::Arc;
use std::time::Duration;

use axum::{Extension, Json};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use super::EmptyResponse;
use crate::{
    object_store::{Headers, ObjectStore},
    types::{nullable_string, AppError, ValidatedJson},
};

/// Largest upload the signed PUT URL accepts (50 MiB)
pub const MAX_UPLOAD_SIZE_BYTES: u64 = 50 * 1024 * 1024;

/// Lifetime of a signed upload URL
pub const UPLOAD_URL_EXPIRY: Duration = Duration::from_secs(15 * 60);

/// Header the storage backend uses to enforce the upload size range
pub const CONTENT_LENGTH_RANGE_HEADER: &str = "X-Goog-Content-Length-Range";

/// Metadata key recording who uploaded an object
pub const UPLOADER_METADATA_KEY: &str = "uploader";

/// Body of `POST /api/upload`
#[derive(Debug, Deserialize, JsonSchema, Validate)]
pub struct UploadRequest {
    /// Original name of the file being uploaded
    #[serde(default, deserialize_with = "nullable_string")]
    #[validate(length(min = 1, message = "must specify filename"))]
    pub filename: String,
}

/// Signed upload URL and the key it writes to
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UploadResponse {
    /// Headers the client must send with its PUT, exactly as given
    pub headers: Headers,
    /// Object key of the upload, passed back to `/api/finish`
    pub id: String,
    /// Signed PUT URL
    pub url: String,
}

/// Body of `POST /api/finish`
#[derive(Debug, Deserialize, JsonSchema, Validate)]
pub struct FinishRequest {
    /// Object key returned by `/api/upload`
    #[serde(default, deserialize_with = "nullable_string")]
    #[validate(length(min = 1, message = "must specify id"))]
    pub id: String,
    /// Email of the uploader
    #[serde(default, deserialize_with = "nullable_string")]
    #[validate(length(min = 1, message = "must specify email"))]
    pub email: String,
}

/// Object key for a new upload of `filename`: a fresh UUID followed by the filename
#[must_use]
pub fn object_key_for(filename: &str) -> String {
    format!("{}/{filename}", Uuid::new_v4())
}

fn upload_headers() -> Headers {
    Headers::from([(
        CONTENT_LENGTH_RANGE_HEADER.to_string(),
        format!("0,{MAX_UPLOAD_SIZE_BYTES}"),
    )])
}

/// Issues a signed URL for uploading one file
///
/// Nothing is written to storage here; the object only exists once the client
/// performs the PUT.
///
/// # Errors
///
/// - `400 BAD_REQUEST` - Missing filename or malformed body
/// - `500 INTERNAL_SERVER_ERROR` - URL signing failed
#[instrument(skip(object_store, payload))]
pub async fn create_upload_url(
    Extension(object_store): Extension<Arc<dyn ObjectStore>>,
    ValidatedJson(payload): ValidatedJson<UploadRequest>,
) -> Result<Json<UploadResponse>, AppError> {
    let key = object_key_for(&payload.filename);

    let presigned = object_store
        .presign_put(&key, &upload_headers(), UPLOAD_URL_EXPIRY)
        .await?;

    tracing::info!("Issued upload URL for {key}, expires at {}", presigned.expires_at);

    Ok(Json(UploadResponse {
        headers: presigned.headers,
        id: key,
        url: presigned.url,
    }))
}

/// Records the uploader of a completed upload
///
/// Other metadata already on the object is preserved. The object's size and
/// content type are not checked against the limits signed into the upload URL.
///
/// # Errors
///
/// - `400 BAD_REQUEST` - Missing id or email
/// - `404 NOT_FOUND` - No object under `id`, e.g. the PUT never happened
/// - `500 INTERNAL_SERVER_ERROR` - Storage operation failed
#[instrument(skip(object_store, payload), fields(key = %payload.id))]
pub async fn finish_upload(
    Extension(object_store): Extension<Arc<dyn ObjectStore>>,
    ValidatedJson(payload): ValidatedJson<FinishRequest>,
) -> Result<Json<EmptyResponse>, AppError> {
    let attrs = object_store
        .object_attrs(&payload.id)
        .await?
        .ok_or_else(|| AppError::not_found("not found"))?;

    let mut metadata = attrs.metadata;
    metadata.insert(UPLOADER_METADATA_KEY.to_string(), payload.email);

    object_store.update_metadata(&attrs.key, metadata).await?;

    tracing::info!(size = attrs.size, "Recorded uploader for {}", attrs.key);

    Ok(Json(EmptyResponse {}))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key_keeps_filename_as_suffix() {
        let key = object_key_for("report.pdf");
        let (prefix, name) = key.split_once('/').unwrap();

        assert_eq!(name, "report.pdf");
        assert!(Uuid::parse_str(prefix).is_ok());
    }

    #[test]
    fn test_object_keys_never_repeat() {
        let first = object_key_for("benchy.stl");
        let second = object_key_for("benchy.stl");
        assert_ne!(first, second);
    }

    #[test]
    fn test_upload_headers_cap_size_at_50_mib() {
        let headers = upload_headers();
        assert_eq!(
            headers.get(CONTENT_LENGTH_RANGE_HEADER).map(String::as_str),
            Some("0,52428800")
        );
    }
}
