#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use secp256k1::SecretKey;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

use wallet_verify::client::{
    AgentError, LocalTransport, MessageSigner, TransportError, VerificationTransport, WalletAgent,
};
use wallet_verify::crypto::{Address, SignatureManager};
use wallet_verify::protocol::{challenge_message, VerifyRequest, VerifyResponse, DEFAULT_PROTOCOL_NAME};
use wallet_verify::server::{router, AppState};

/// Create a test router with a fresh verifier
pub fn test_router() -> Router {
    router(AppState::default())
}

/// POST a raw body to the verification endpoint and return (status, json body)
pub async fn post_raw(body: impl Into<Body>) -> (StatusCode, Value) {
    let response = test_router()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/verify-wallets")
                .header("content-type", "application/json")
                .body(body.into())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

pub async fn post_json(body: Value) -> (StatusCode, Value) {
    post_raw(body.to_string()).await
}

/// Generate test keypairs for testing
pub fn generate_test_keypairs(count: usize) -> Vec<(SecretKey, Address)> {
    let manager = SignatureManager::new();
    (0..count).map(|_| manager.generate_keypair()).collect()
}

/// Build a (address, message, signature) triple where `signer` signs the
/// challenge for `claimed`.
pub fn signed_challenge(signer: &SecretKey, claimed: &str) -> (String, String, String) {
    let manager = SignatureManager::new();
    let message = challenge_message(DEFAULT_PROTOCOL_NAME, claimed);
    let signature = manager.sign_personal_message(&message, signer).unwrap();
    (claimed.to_string(), message, signature)
}

/// Scripted wallet agent: each step either succeeds or rejects.
///
/// Signing answers come from `queued` first, one per signer handed out, then
/// fall back to `signature`.
pub struct FakeAgent {
    pub accounts: Result<Vec<String>, AgentError>,
    pub signature: Result<String, AgentError>,
    pub queued: std::sync::Mutex<VecDeque<Result<String, AgentError>>>,
    pub signed_messages: Arc<std::sync::Mutex<Vec<String>>>,
}

impl FakeAgent {
    pub fn new(accounts: Result<Vec<String>, AgentError>, signature: Result<String, AgentError>) -> Self {
        Self {
            accounts,
            signature,
            queued: std::sync::Mutex::new(VecDeque::new()),
            signed_messages: Arc::new(std::sync::Mutex::new(Vec::new())),
        }
    }

    /// Agent whose first signing attempts answer with `first`, in order,
    /// before settling on `then`.
    pub fn with_signatures(
        accounts: Result<Vec<String>, AgentError>,
        first: Vec<Result<String, AgentError>>,
        then: Result<String, AgentError>,
    ) -> Self {
        let agent = Self::new(accounts, then);
        agent.queued.lock().unwrap().extend(first);
        agent
    }
}

struct FakeSigner {
    signature: Result<String, AgentError>,
    signed_messages: Arc<std::sync::Mutex<Vec<String>>>,
}

#[async_trait::async_trait]
impl WalletAgent for FakeAgent {
    async fn request_accounts(&self) -> Result<Vec<String>, AgentError> {
        self.accounts.clone()
    }

    async fn get_signer(&self) -> Result<Box<dyn MessageSigner>, AgentError> {
        let signature = self
            .queued
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.signature.clone());
        Ok(Box::new(FakeSigner {
            signature,
            signed_messages: self.signed_messages.clone(),
        }))
    }
}

#[async_trait::async_trait]
impl MessageSigner for FakeSigner {
    async fn sign_message(&self, message: &str) -> Result<String, AgentError> {
        self.signed_messages.lock().unwrap().push(message.to_string());
        self.signature.clone()
    }
}

/// Transport that counts submissions and delegates to an in-process verifier,
/// or fails when `fail` is set.
#[derive(Default)]
pub struct CountingTransport {
    pub calls: AtomicUsize,
    pub fail: bool,
    pub requests: std::sync::Mutex<Vec<VerifyRequest>>,
    inner: LocalTransport,
}

impl CountingTransport {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl VerificationTransport for CountingTransport {
    async fn submit(&self, request: &VerifyRequest) -> Result<VerifyResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        if self.fail {
            return Err(TransportError::Request("connection refused".to_string()));
        }
        self.inner.submit(request).await
    }
}
