//! Challenge construction and the wire schema shared by client and server.

use serde::{Deserialize, Serialize};

use crate::error::VerificationError;

pub const DEFAULT_PROTOCOL_NAME: &str = "Amicbridge";

pub const VERIFY_PATH: &str = "/api/verify-wallets";

/// Build the message a wallet is asked to sign.
///
/// The claimed address is embedded verbatim so a signature made for one
/// address cannot be presented for another.
pub fn challenge_message(protocol_name: &str, address: &str) -> String {
    format!("{} Wallet Verification\nAddress: {}", protocol_name, address)
}

/// Verification request body.
///
/// Fields are optional on the wire so an incomplete body still deserializes
/// and can be answered with a structured "Missing fields." error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyRequest {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub signature: Option<String>,
}

/// A request whose fields are all present and non-empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedRequest<'a> {
    pub address: &'a str,
    pub message: &'a str,
    pub signature: &'a str,
}

impl VerifyRequest {
    pub fn new(
        address: impl Into<String>,
        message: impl Into<String>,
        signature: impl Into<String>,
    ) -> Self {
        Self {
            address: Some(address.into()),
            message: Some(message.into()),
            signature: Some(signature.into()),
        }
    }

    pub fn validate(&self) -> Result<ValidatedRequest<'_>, VerificationError> {
        fn present(field: &Option<String>) -> Option<&str> {
            field.as_deref().filter(|value| !value.is_empty())
        }

        match (
            present(&self.address),
            present(&self.message),
            present(&self.signature),
        ) {
            (Some(address), Some(message), Some(signature)) => Ok(ValidatedRequest {
                address,
                message,
                signature,
            }),
            _ => Err(VerificationError::MissingFields),
        }
    }
}

/// Verification response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recovered: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VerifyResponse {
    /// Recovery succeeded; `valid` says whether the signer matched the claim.
    pub fn checked(valid: bool, recovered: impl Into<String>) -> Self {
        Self {
            valid,
            recovered: Some(recovered.into()),
            error: None,
        }
    }

    pub fn rejected(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            recovered: None,
            error: Some(error.into()),
        }
    }
}
