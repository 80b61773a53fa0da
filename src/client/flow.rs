//! Client verification flow
//!
//! Drives a wallet agent through connect, sign and submit, one attempt at a
//! time. Every failure ends the attempt in [`FlowStatus::Error`] with a
//! user-facing message; nothing is retried automatically.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::agent::{AgentError, WalletAgent};
use super::transport::{TransportError, VerificationTransport};
use crate::protocol::{challenge_message, VerifyRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowStatus {
    Idle,
    Connecting,
    Signing,
    Verifying,
    Success,
    Error,
}

impl FlowStatus {
    /// Whether a new attempt may be started from this status.
    pub fn accepts_trigger(&self) -> bool {
        matches!(self, FlowStatus::Idle | FlowStatus::Error)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FlowStatus::Idle => "idle",
            FlowStatus::Connecting => "connecting",
            FlowStatus::Signing => "signing",
            FlowStatus::Verifying => "verifying",
            FlowStatus::Success => "success",
            FlowStatus::Error => "error",
        }
    }

    /// Progress label shown on the verification control.
    pub fn label(&self) -> &'static str {
        match self {
            FlowStatus::Idle => "Verify Wallet",
            FlowStatus::Connecting => "Connecting…",
            FlowStatus::Signing => "Waiting for signature…",
            FlowStatus::Verifying => "Verifying…",
            FlowStatus::Success => "Verified",
            FlowStatus::Error => "Retry",
        }
    }
}

impl std::fmt::Display for FlowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why an attempt ended in error. `Display` is the message shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    #[error("No wallet detected. Install MetaMask or use a Web3 wallet.")]
    AgentAbsent,

    #[error("Could not access wallet accounts.")]
    NoAccounts,

    #[error("{0}")]
    Agent(#[from] AgentError),

    #[error("Could not reach the verification service.")]
    Transport(#[from] TransportError),

    #[error("Signature could not be verified.")]
    NotVerified,

    /// Trigger pressed while it is disabled. Leaves the flow untouched.
    #[error("Verification is not available while {0}.")]
    Unavailable(FlowStatus),
}

pub struct VerificationFlow {
    agent: Option<Arc<dyn WalletAgent>>,
    transport: Arc<dyn VerificationTransport>,
    protocol_name: String,
    status: FlowStatus,
    error: Option<String>,
    wallet_address: Option<String>,
    verified: bool,
    history: Vec<FlowStatus>,
}

impl VerificationFlow {
    /// `agent` is `None` when no wallet is available in the environment.
    pub fn new(
        agent: Option<Arc<dyn WalletAgent>>,
        transport: Arc<dyn VerificationTransport>,
        protocol_name: impl Into<String>,
    ) -> Self {
        Self {
            agent,
            transport,
            protocol_name: protocol_name.into(),
            status: FlowStatus::Idle,
            error: None,
            wallet_address: None,
            verified: false,
            history: vec![FlowStatus::Idle],
        }
    }

    pub fn status(&self) -> FlowStatus {
        self.status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Claimed address while an attempt is in flight, verified address after success.
    pub fn wallet_address(&self) -> Option<&str> {
        self.wallet_address.as_deref()
    }

    pub fn is_verified(&self) -> bool {
        self.verified
    }

    pub fn is_trigger_enabled(&self) -> bool {
        self.status.accepts_trigger()
    }

    /// Statuses visited during the latest attempt, starting at `idle`.
    pub fn history(&self) -> &[FlowStatus] {
        &self.history
    }

    /// Run one verification attempt.
    ///
    /// Refused without side effects unless the flow is `idle` or `error`.
    /// Returns the verified address on success.
    pub async fn verify(&mut self) -> Result<String, FlowError> {
        if !self.status.accepts_trigger() {
            return Err(FlowError::Unavailable(self.status));
        }

        self.reset();

        match self.run_attempt().await {
            Ok(address) => {
                info!("Wallet verified: {}", address);
                self.verified = true;
                self.transition(FlowStatus::Success);
                Ok(address)
            }
            Err(err) => {
                warn!("Wallet verification failed: {}", err);
                self.error = Some(err.to_string());
                self.wallet_address = None;
                self.transition(FlowStatus::Error);
                Err(err)
            }
        }
    }

    async fn run_attempt(&mut self) -> Result<String, FlowError> {
        self.transition(FlowStatus::Connecting);

        let agent = self.agent.clone().ok_or(FlowError::AgentAbsent)?;
        let accounts = agent.request_accounts().await?;
        let address = accounts.into_iter().next().ok_or(FlowError::NoAccounts)?;
        self.wallet_address = Some(address.clone());

        self.transition(FlowStatus::Signing);
        let message = challenge_message(&self.protocol_name, &address);
        let signer = agent.get_signer().await?;
        let signature = signer.sign_message(&message).await?;

        self.transition(FlowStatus::Verifying);
        let request = VerifyRequest::new(address.clone(), message, signature);
        let response = self.transport.submit(&request).await?;

        if !response.valid {
            return Err(FlowError::NotVerified);
        }
        Ok(address)
    }

    fn reset(&mut self) {
        self.status = FlowStatus::Idle;
        self.error = None;
        self.wallet_address = None;
        self.history = vec![FlowStatus::Idle];
    }

    fn transition(&mut self, next: FlowStatus) {
        debug!("Verification flow: {} -> {}", self.status, next);
        self.status = next;
        self.history.push(next);
    }
}
