//! Stateless wallet verification
//!
//! Turns a request body into a status code and response body. Holds no
//! mutable state, so one instance is shared across all requests.

use axum::http::StatusCode;
use tracing::{error, info, warn};

use crate::crypto::SignatureManager;
use crate::error::VerificationError;
use crate::protocol::{VerifyRequest, VerifyResponse};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationOutcome {
    pub status: StatusCode,
    pub body: VerifyResponse,
}

impl VerificationOutcome {
    pub fn failure(err: &VerificationError) -> Self {
        Self {
            status: err.status_code(),
            body: VerifyResponse::rejected(err.to_string()),
        }
    }
}

#[derive(Default)]
pub struct WalletVerifier {
    signatures: SignatureManager,
}

impl WalletVerifier {
    pub fn new() -> Self {
        Self {
            signatures: SignatureManager::new(),
        }
    }

    pub fn verify(&self, request: &VerifyRequest) -> VerificationOutcome {
        let fields = match request.validate() {
            Ok(fields) => fields,
            Err(err) => {
                warn!("Rejected verification request: {}", err);
                return VerificationOutcome::failure(&err);
            }
        };

        match self.signatures.recover_signer(fields.message, fields.signature) {
            Ok(recovered) => {
                let valid = recovered.matches(fields.address);
                info!(
                    "Wallet verification for {}: recovered {} (valid: {})",
                    fields.address, recovered, valid
                );
                VerificationOutcome {
                    status: StatusCode::OK,
                    body: VerifyResponse::checked(valid, recovered.to_string()),
                }
            }
            Err(err) => {
                error!("Signature recovery failed for {}: {}", fields.address, err);
                VerificationOutcome::failure(&err)
            }
        }
    }
}
