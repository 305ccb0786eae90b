use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::domain::DomainError;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

/// Maps a `DomainError` onto an HTTP status and a JSON error body.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            DomainError::NotFound(_) => StatusCode::NOT_FOUND,
            DomainError::InvalidInput(_) | DomainError::DimensionMismatch { .. } => {
                StatusCode::BAD_REQUEST
            }
            DomainError::DegenerateVector => StatusCode::UNPROCESSABLE_ENTITY,
            DomainError::AlreadyExists(_) => StatusCode::CONFLICT,
            DomainError::NotReady(_) => StatusCode::SERVICE_UNAVAILABLE,
            DomainError::ExternalService(_) => StatusCode::BAD_GATEWAY,
            DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(error: DomainError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, kind = self.0.kind(), "request failed");
        } else {
            tracing::debug!(error = %self.0, kind = self.0.kind(), "request rejected");
        }

        let body = ErrorBody {
            error: self.0.kind(),
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
