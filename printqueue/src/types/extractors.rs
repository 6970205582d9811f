//! Custom extractors for request validation

use aide::{operation::OperationInput, OperationOutput};
use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    Json,
};
use schemars::JsonSchema;
use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use validator::{Validate, ValidationErrors};

use crate::types::error::AppError;

/// JSON extractor that validates the payload
///
/// The body is parsed as JSON regardless of `Content-Type`. Parse failures and
/// validation failures both become `400 Bad Request` with a plain-text message.
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|err| AppError::bad_request(err.body_text()))?;

        let payload: T =
            serde_json::from_slice(&body).map_err(|err| AppError::bad_request(err.to_string()))?;

        payload.validate().map_err(|errors| validation_error(&errors))?;

        Ok(Self(payload))
    }
}

/// Deserializes a JSON `null` string field as the empty string
///
/// Pair with `#[serde(default)]` so missing and `null` fields both reach validation.
///
/// # Errors
///
/// Fails when the value is neither a string nor `null`
pub fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Picks the message of the first failing field, ordered by field name
fn validation_error(errors: &ValidationErrors) -> AppError {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|(a, _), (b, _)| a.cmp(b));

    fields
        .into_iter()
        .find_map(|(_, field_errors)| {
            field_errors
                .first()
                .and_then(|error| error.message.clone())
        })
        .map_or_else(
            || AppError::bad_request("invalid request"),
            AppError::bad_request,
        )
}

impl<T> OperationInput for ValidatedJson<T>
where
    T: JsonSchema,
{
    fn operation_input(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) {
        // Same wire shape as Json<T>
        Json::<T>::operation_input(ctx, operation);
    }

    fn inferred_early_responses(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Vec<(Option<u16>, aide::openapi::Response)> {
        AppError::inferred_responses(ctx, operation)
    }
}
