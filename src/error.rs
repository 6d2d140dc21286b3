use crate::services::relay::RelayError;
use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("All fields are required")]
    Validation,
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Persistence error: {0}")]
    Persistence(#[from] std::io::Error),
    #[error("Delivery error: {0}")]
    Delivery(#[from] RelayError),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Validation => {
                tracing::debug!("Rejected submission with missing fields");
                (StatusCode::BAD_REQUEST, "All fields are required")
            }
            Self::MethodNotAllowed => {
                return (
                    StatusCode::METHOD_NOT_ALLOWED,
                    [(header::ALLOW, "POST")],
                    Json(json!({ "message": "Method not allowed" })),
                )
                    .into_response();
            }
            Self::Persistence(e) => {
                tracing::error!(error = %e, "Error saving message");
                (StatusCode::INTERNAL_SERVER_ERROR, "Error saving message")
            }
            Self::Delivery(e) => {
                tracing::error!(error = %e, "Error sending message");
                (StatusCode::INTERNAL_SERVER_ERROR, "Error sending message")
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::Validation.into_response().status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::MethodNotAllowed.into_response().status(), StatusCode::METHOD_NOT_ALLOWED);

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "/var/secret/messages");
        assert_eq!(AppError::from(io).into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            AppError::from(RelayError::Unavailable).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_method_not_allowed_advertises_post() {
        let response = AppError::MethodNotAllowed.into_response();
        assert_eq!(response.headers().get(header::ALLOW).map(|v| v.as_bytes()), Some(&b"POST"[..]));
    }
}
