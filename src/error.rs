use crate::credentials::CredentialError;
use crate::signature::{SigningError, VerificationError};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Message returned for every signature verification failure
pub const INVALID_SIGNATURE_MESSAGE: &str = "Invalid request signature";

/// The main error type for cardhook handlers
#[derive(Debug, thiserror::Error)]
pub enum CardhookError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

/// JSON body of every error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    error: String,
    error_id: String,
}

impl CardhookError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn payload_too_large(msg: impl Into<String>) -> Self {
        Self::PayloadTooLarge(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Internal(_) | Self::Config(_) | Self::Anyhow(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to send to the client.
    ///
    /// Client errors keep their message. Server errors collapse to a generic
    /// text; the full error is only written to the server log.
    fn safe_message(&self) -> String {
        match self {
            Self::BadRequest(msg) => format!("Bad request: {}", msg),
            Self::Unauthorized(msg) => format!("Unauthorized: {}", msg),
            Self::PayloadTooLarge(_) => "Payload too large".to_string(),

            Self::Internal(_) | Self::Config(_) | Self::Anyhow(_) => {
                "Internal server error".to_string()
            }
        }
    }
}

impl IntoResponse for CardhookError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_id = uuid::Uuid::new_v4().to_string();

        if status.is_server_error() {
            tracing::error!(
                status = status.as_u16(),
                error_id = %error_id,
                error = %self,
                "Request failed"
            );
        } else {
            tracing::info!(
                status = status.as_u16(),
                error_id = %error_id,
                error = %self,
                "Request rejected"
            );
        }

        let body = Json(ErrorResponse {
            error: self.safe_message(),
            error_id,
        });

        (status, body).into_response()
    }
}

/// Result type alias for cardhook handlers
pub type Result<T> = std::result::Result<T, CardhookError>;

/// Every verification failure becomes the same 401; the specific kind has
/// already been logged by the verifier.
impl From<VerificationError> for CardhookError {
    fn from(_: VerificationError) -> Self {
        CardhookError::Unauthorized(INVALID_SIGNATURE_MESSAGE.to_string())
    }
}

impl From<SigningError> for CardhookError {
    fn from(err: SigningError) -> Self {
        CardhookError::Internal(format!("Response signing failed: {}", err))
    }
}

impl From<CredentialError> for CardhookError {
    fn from(err: CredentialError) -> Self {
        CardhookError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for CardhookError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            CardhookError::BadRequest(format!("JSON error: {}", err))
        } else {
            CardhookError::Internal(format!("JSON serialization error: {}", err))
        }
    }
}
