pub mod address;
pub mod signatures;

pub use address::Address;
pub use signatures::{hash_personal_message, SignatureManager};
