use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

// Fixed message returned when a caller runs out of free attempts
pub const RATE_LIMIT_MESSAGE: &str =
    "You have used all your free design attempts. Contact support for more information.";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("rate limit exceeded")]
    RateLimited,

    #[error("upstream request failed: {0}")]
    Upstream(String),

    #[error("upstream response contained no image")]
    MissingImage,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                RATE_LIMIT_MESSAGE.to_string(),
            ),
            AppError::Upstream(cause) => {
                tracing::error!(%cause, "upstream request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "server error".to_string(),
                )
            }
            AppError::MissingImage => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "no image was generated".to_string(),
            ),
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_map_to_expected_statuses() {
        assert_eq!(
            AppError::RateLimited.into_response().status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            AppError::Upstream("connection refused".into())
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::MissingImage.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
