use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Missing X-Line-Signature header")]
    MissingSignature,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Invalid webhook payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),

    #[error("Request body is not valid UTF-8")]
    InvalidBody,

    #[error("Request body too large")]
    PayloadTooLarge,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::MissingSignature
            | AppError::InvalidSignature
            | AppError::InvalidPayload(_)
            | AppError::InvalidBody => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        };

        tracing::warn!("Error occurred: {}", self);

        // The platform only looks at the status code.
        status.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_errors_are_bad_request() {
        assert_eq!(
            AppError::InvalidSignature.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::MissingSignature.into_response().status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn oversized_body_is_payload_too_large() {
        assert_eq!(
            AppError::PayloadTooLarge.into_response().status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
    }
}
