//! Submitting signed challenges to the verification endpoint.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::protocol::{VerifyRequest, VerifyResponse};
use crate::server::WalletVerifier;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Unreadable response: {0}")]
    Response(String),
}

#[async_trait]
pub trait VerificationTransport: Send + Sync {
    /// Deliver one request and return the parsed response body, whatever
    /// the HTTP status was.
    async fn submit(&self, request: &VerifyRequest) -> Result<VerifyResponse, TransportError>;
}

/// JSON over HTTP to a remote endpoint.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl VerificationTransport for HttpTransport {
    async fn submit(&self, request: &VerifyRequest) -> Result<VerifyResponse, TransportError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status();
        let body = response
            .json::<VerifyResponse>()
            .await
            .map_err(|e| TransportError::Response(e.to_string()))?;

        debug!(
            "Verification endpoint {} answered {} (valid: {})",
            self.endpoint, status, body.valid
        );
        Ok(body)
    }
}

/// Calls an in-process verifier directly.
#[derive(Clone, Default)]
pub struct LocalTransport {
    verifier: Arc<WalletVerifier>,
}

impl LocalTransport {
    pub fn new(verifier: Arc<WalletVerifier>) -> Self {
        Self { verifier }
    }
}

#[async_trait]
impl VerificationTransport for LocalTransport {
    async fn submit(&self, request: &VerifyRequest) -> Result<VerifyResponse, TransportError> {
        Ok(self.verifier.verify(request).body)
    }
}
