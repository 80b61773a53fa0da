pub mod agent;
pub mod flow;
pub mod transport;

pub use agent::{AgentError, LocalWallet, MessageSigner, WalletAgent};
pub use flow::{FlowError, FlowStatus, VerificationFlow};
pub use transport::{HttpTransport, LocalTransport, TransportError, VerificationTransport};
