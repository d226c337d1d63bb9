use auth::AuthError;
use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use catalog::CatalogError;
use serde::Serialize;
use validator::ValidationErrors;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Every failure a handler can return, mapped to a stable status code
#[derive(Debug)]
pub enum ApiError {
    Validation(String),
    BadRequest(String),
    DuplicateEmail,
    InvalidCredentials,
    InvalidToken,
    Unauthenticated,
    AuthorNotFound(i64),
    NotFound(&'static str),
    UnsupportedMediaType,
    MalformedPayload,
    MissingFile,
    RateLimited(String),
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::BadRequest(_)
            | ApiError::DuplicateEmail
            | ApiError::AuthorNotFound(_)
            | ApiError::UnsupportedMediaType
            | ApiError::MalformedPayload
            | ApiError::MissingFile => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials | ApiError::InvalidToken | ApiError::Unauthenticated => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> String {
        match self {
            ApiError::Validation(msg) | ApiError::BadRequest(msg) | ApiError::RateLimited(msg) => {
                msg.clone()
            }
            ApiError::DuplicateEmail => "Email already registered".to_string(),
            ApiError::InvalidCredentials => "Invalid credentials".to_string(),
            ApiError::InvalidToken => "Invalid or expired token".to_string(),
            ApiError::Unauthenticated => "Not authenticated".to_string(),
            ApiError::AuthorNotFound(id) => format!("Author with id {id} does not exist"),
            ApiError::NotFound(what) => format!("{what} not found"),
            ApiError::UnsupportedMediaType => "Only JSON files are supported".to_string(),
            ApiError::MalformedPayload => "Invalid JSON file".to_string(),
            ApiError::MissingFile => "No file provided in request".to_string(),
            // Detail is logged, never sent to the client.
            ApiError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(detail) = &self {
            tracing::error!(error = %detail, "request failed");
        }
        let error = ErrorResponse {
            error: self.message(),
        };
        (self.status_code(), Json(error)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::DuplicateEmail => ApiError::DuplicateEmail,
            AuthError::InvalidCredentials => ApiError::InvalidCredentials,
            AuthError::InvalidToken => ApiError::InvalidToken,
            AuthError::Unauthenticated => ApiError::Unauthenticated,
            other @ (AuthError::HashingError(_)
            | AuthError::TokenGenerationError(_)
            | AuthError::Database(_)) => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::AuthorNotFound(id) => ApiError::AuthorNotFound(id),
            CatalogError::Database(e) => ApiError::Internal(e.to_string()),
        }
    }
}

// Well-formed input of the wrong shape is a validation failure; anything
// that never got that far is a plain bad request.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(e) => ApiError::Validation(e.body_text()),
            other => ApiError::BadRequest(other.body_text()),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(err: ValidationErrors) -> Self {
        ApiError::Validation(err.to_string())
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
