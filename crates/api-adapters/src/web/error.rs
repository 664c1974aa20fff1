//! Domain errors rendered as HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domains::DomainError;

use crate::envelope::ApiResponse;

#[derive(Debug)]
pub struct ApiError(pub DomainError);

pub type ApiResult<T> = Result<T, ApiError>;

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

pub fn status_of(err: &DomainError) -> StatusCode {
    match err {
        DomainError::Validation(_) | DomainError::Unavailable(_) => StatusCode::BAD_REQUEST,
        DomainError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::DuplicateApplication | DomainError::Conflict(_) => StatusCode::CONFLICT,
        DomainError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Client-facing message. Server failures are logged, never echoed.
fn public_message(err: &DomainError) -> String {
    match err {
        DomainError::Validation(m)
        | DomainError::Forbidden(m)
        | DomainError::Unavailable(m)
        | DomainError::Unauthorized(m)
        | DomainError::Conflict(m) => m.clone(),
        DomainError::NotFound { .. } | DomainError::DuplicateApplication => err.to_string(),
        DomainError::Server(detail) => {
            tracing::error!(error = %detail, "request failed");
            "internal server error".to_owned()
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_of(&self.0);
        if status.is_client_error() {
            tracing::debug!(kind = self.0.kind(), error = %self.0, "request rejected");
        }
        (status, ApiResponse::error(public_message(&self.0))).into_response()
    }
}
