use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;

use crate::protocol::VerifyResponse;

impl From<serde_json::Error> for VerificationError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidRequest(err.to_string())
    }
}

impl From<secp256k1::Error> for VerificationError {
    fn from(err: secp256k1::Error) -> Self {
        Self::RecoveryFailed(err.to_string())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    #[error("Missing fields.")]
    MissingFields,

    #[error("Invalid request body: {0}")]
    InvalidRequest(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Signature recovery failed: {0}")]
    RecoveryFailed(String),

    #[error("Cryptographic error: {0}")]
    CryptoError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl VerificationError {
    /// HTTP status for this failure. Only missing fields are a client error;
    /// anything that fails while processing the body, parsing included, is a 500.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingFields => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn invalid_signature_length(length: usize) -> Self {
        Self::InvalidSignature(format!(
            "expected 64 or 65 bytes, got {}",
            length
        ))
    }

    pub fn invalid_recovery_byte(v: u8) -> Self {
        Self::InvalidSignature(format!("invalid recovery byte v={}", v))
    }
}

impl IntoResponse for VerificationError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(VerifyResponse::rejected(self.to_string()))).into_response()
    }
}
