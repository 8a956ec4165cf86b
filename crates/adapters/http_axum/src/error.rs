//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use climahub_domain::error::{ClimaError, NotFoundError};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`ClimaError`] to an HTTP response with appropriate status code.
#[derive(Debug)]
pub struct ApiError(ClimaError);

impl ApiError {
    /// An identifier in the path that does not parse names nothing.
    pub(crate) fn unknown(entity: &'static str, id: &str) -> Self {
        Self(
            NotFoundError {
                entity,
                id: id.to_string(),
            }
            .into(),
        )
    }
}

impl From<ClimaError> for ApiError {
    fn from(err: ClimaError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            ClimaError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            ClimaError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            ClimaError::Storage(err) => {
                tracing::error!(error = %err, "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            ClimaError::Device(err) => {
                tracing::warn!(error = %err, "device error");
                (StatusCode::BAD_GATEWAY, err.to_string())
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
