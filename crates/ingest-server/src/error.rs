use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use domain::DomainError;
use serde_json::json;
use tracing::error;

/// `DomainError` rendered as `{"error": <kind>, "message": ...}`
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self(DomainError::Validation(message.into()))
    }

    pub fn status(&self) -> StatusCode {
        match &self.0 {
            DomainError::Validation(_) | DomainError::NoValidMeasurements(_) => {
                StatusCode::BAD_REQUEST
            }
            DomainError::BatchTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            DomainError::NotFound { .. } | DomainError::SchemaNotFound(_) => StatusCode::NOT_FOUND,
            DomainError::Conflict(_) => StatusCode::CONFLICT,
            DomainError::DeadlineExceeded(_) => StatusCode::GATEWAY_TIMEOUT,
            DomainError::Cancelled => StatusCode::REQUEST_TIMEOUT,
            DomainError::Store(_) | DomainError::InvalidConfiguration(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Storage details stay in the log
        let message = match &self.0 {
            DomainError::Store(_) | DomainError::InvalidConfiguration(_) => {
                error!(error = %self.0, "Request failed");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };

        (
            status,
            Json(json!({ "error": self.0.kind(), "message": message })),
        )
            .into_response()
    }
}
