pub mod client;
pub mod config;
pub mod crypto;
pub mod error;
pub mod protocol;
pub mod server;

pub use error::VerificationError;
