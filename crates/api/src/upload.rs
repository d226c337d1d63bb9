use axum::extract::{FromRequest, Multipart, Request};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ApiError, ApiResult};

/// Items decoded from an uploaded `.json` file; see [`read_json_file`].
#[derive(Debug)]
pub struct JsonFile<T>(pub Vec<T>);

impl<S, T> FromRequest<S> for JsonFile<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let multipart = Multipart::from_request(req, state).await?;
        read_json_file(multipart).await.map(Self)
    }
}

/// Pull the `file` field out of a multipart body and decode it as a JSON array.
///
/// The filename must end in `.json`. Syntax errors are a malformed payload,
/// well-formed JSON of the wrong shape is a validation failure.
pub async fn read_json_file<T: DeserializeOwned>(mut multipart: Multipart) -> ApiResult<Vec<T>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("Failed to read multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        if !file_name.ends_with(".json") {
            return Err(ApiError::UnsupportedMediaType);
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::Validation(format!("Failed to read file data: {e}")))?;

        return decode_items(&bytes);
    }

    Err(ApiError::MissingFile)
}

fn decode_items<T: DeserializeOwned>(bytes: &[u8]) -> ApiResult<Vec<T>> {
    let document: Value = serde_json::from_slice(bytes).map_err(|e| {
        tracing::debug!(error = %e, "uploaded file is not JSON");
        ApiError::MalformedPayload
    })?;

    serde_json::from_value(document)
        .map_err(|e| ApiError::Validation(format!("Invalid item in file: {e}")))
}
