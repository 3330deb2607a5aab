//! Error handling - maps application errors to the wire shape.

use std::fmt;

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use quad_core::{DomainError, RepoError};
use quad_shared::ErrorBody;

/// Application-level errors, rendered as `{"error": {"message", "statusCode"}}`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

/// Result type alias for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::Internal(msg) => f.write_str(msg),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        HttpResponse::build(status).json(ErrorBody::new(status.as_u16(), self.to_string()))
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => ApiError::BadRequest(msg),
            DomainError::NotFound(what) => ApiError::NotFound(format!("{what} not found")),
            DomainError::Conflict(msg) => ApiError::Conflict(msg),
            DomainError::Integrity(msg) => ApiError::BadRequest(msg),
            DomainError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

/// Store failures on read paths surface as an opaque 500 with the real
/// error in the log. Write paths match on the variant themselves, since
/// their messages are endpoint-specific.
impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::UniqueViolation(msg) => ApiError::Conflict(msg),
            RepoError::ForeignKeyViolation(msg) => ApiError::BadRequest(msg),
            RepoError::Connection(msg) | RepoError::Query(msg) => {
                tracing::error!(error = %msg, "Store error");
                ApiError::Internal("Internal server error".to_string())
            }
        }
    }
}

/// Rewrites actix's JSON extractor failures into the shared error shape.
pub fn json_error_handler(
    err: actix_web::error::JsonPayloadError,
    _req: &HttpRequest,
) -> actix_web::Error {
    let body = ErrorBody::new(400, err.to_string());
    actix_web::error::InternalError::from_response(err, HttpResponse::BadRequest().json(body))
        .into()
}

/// Same treatment for query string deserialization failures.
pub fn query_error_handler(
    err: actix_web::error::QueryPayloadError,
    _req: &HttpRequest,
) -> actix_web::Error {
    let body = ErrorBody::new(400, err.to_string());
    actix_web::error::InternalError::from_response(err, HttpResponse::BadRequest().json(body))
        .into()
}
