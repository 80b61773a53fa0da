//! Wallet agent capability
//!
//! The external software that holds the user's key. The flow only calls it
//! and interprets success or rejection; any implementation may prompt the
//! user and take as long as the user needs.

use async_trait::async_trait;
use secp256k1::SecretKey;
use std::sync::Arc;
use thiserror::Error;

use crate::crypto::{Address, SignatureManager};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentError {
    /// The user declined the prompt.
    #[error("{0}")]
    Rejected(String),

    /// The agent could not complete the request.
    #[error("{0}")]
    Failed(String),
}

#[async_trait]
pub trait WalletAgent: Send + Sync {
    /// Ask for account access. May prompt the user.
    async fn request_accounts(&self) -> Result<Vec<String>, AgentError>;

    async fn get_signer(&self) -> Result<Box<dyn MessageSigner>, AgentError>;
}

#[async_trait]
pub trait MessageSigner: Send + Sync {
    /// Personal-message signature over `message`. May prompt the user.
    async fn sign_message(&self, message: &str) -> Result<String, AgentError>;
}

/// Wallet agent backed by an in-memory secret key.
#[derive(Clone)]
pub struct LocalWallet {
    secret_key: SecretKey,
    address: Address,
    signatures: Arc<SignatureManager>,
}

impl LocalWallet {
    pub fn new(secret_key: SecretKey) -> Self {
        let signatures = SignatureManager::new();
        let address = signatures.address_from_secret(&secret_key);
        Self {
            secret_key,
            address,
            signatures: Arc::new(signatures),
        }
    }

    pub fn random() -> Self {
        let signatures = SignatureManager::new();
        let (secret_key, address) = signatures.generate_keypair();
        Self {
            secret_key,
            address,
            signatures: Arc::new(signatures),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }
}

#[async_trait]
impl WalletAgent for LocalWallet {
    async fn request_accounts(&self) -> Result<Vec<String>, AgentError> {
        Ok(vec![self.address.to_checksum()])
    }

    async fn get_signer(&self) -> Result<Box<dyn MessageSigner>, AgentError> {
        Ok(Box::new(self.clone()))
    }
}

#[async_trait]
impl MessageSigner for LocalWallet {
    async fn sign_message(&self, message: &str) -> Result<String, AgentError> {
        self.signatures
            .sign_personal_message(message, &self.secret_key)
            .map_err(|e| AgentError::Failed(e.to_string()))
    }
}
