use secp256k1::{
    ecdsa::{RecoverableSignature, RecoveryId},
    Message, PublicKey, Secp256k1, SecretKey,
};
use sha3::{Digest, Keccak256};

use super::address::Address;
use crate::error::VerificationError;

/// Domain prefix mixed into every personal-message hash so a signed message can
/// never be mistaken for a signed transaction.
pub const PERSONAL_MESSAGE_PREFIX: &str = "\x19Ethereum Signed Message:\n";

/// Personal-message hash: `keccak256(prefix || len(message) || message)`.
pub fn hash_personal_message(message: &str) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(PERSONAL_MESSAGE_PREFIX.as_bytes());
    hasher.update(message.len().to_string().as_bytes());
    hasher.update(message.as_bytes());
    hasher.finalize().into()
}

pub struct SignatureManager {
    secp: Secp256k1<secp256k1::All>,
}

impl SignatureManager {
    pub fn new() -> Self {
        Self {
            secp: Secp256k1::new(),
        }
    }

    /// Sign `message` with the personal-message scheme.
    ///
    /// Returns `0x`-prefixed hex of `r || s || v` with `v` in {27, 28}.
    pub fn sign_personal_message(
        &self,
        message: &str,
        secret_key: &SecretKey,
    ) -> Result<String, VerificationError> {
        let message_hash = hash_personal_message(message);
        let message_hash = Message::from_digest_slice(&message_hash)
            .map_err(|e| VerificationError::CryptoError(format!("Invalid message hash: {}", e)))?;

        let signature = self.secp.sign_ecdsa_recoverable(&message_hash, secret_key);
        let (recovery_id, compact) = signature.serialize_compact();

        let mut bytes = [0u8; 65];
        bytes[..64].copy_from_slice(&compact);
        bytes[64] = 27 + recovery_id.to_i32() as u8;

        Ok(format!("0x{}", hex::encode(bytes)))
    }

    /// Recover the address that produced `signature` over `message`.
    pub fn recover_signer(
        &self,
        message: &str,
        signature: &str,
    ) -> Result<Address, VerificationError> {
        let signature = parse_signature(signature)?;
        let message_hash = hash_personal_message(message);
        let message_hash = Message::from_digest_slice(&message_hash)
            .map_err(|e| VerificationError::CryptoError(format!("Invalid message hash: {}", e)))?;

        let public_key = self.secp.recover_ecdsa(&message_hash, &signature)?;
        Ok(Address::from_public_key(&public_key))
    }

    pub fn public_key_from_secret(&self, secret_key: &SecretKey) -> PublicKey {
        PublicKey::from_secret_key(&self.secp, secret_key)
    }

    pub fn address_from_secret(&self, secret_key: &SecretKey) -> Address {
        Address::from_public_key(&self.public_key_from_secret(secret_key))
    }

    /// Generate a new keypair
    pub fn generate_keypair(&self) -> (SecretKey, Address) {
        let mut rng = rand::rngs::OsRng;
        let secret_key = SecretKey::new(&mut rng);
        let address = self.address_from_secret(&secret_key);
        (secret_key, address)
    }
}

impl Default for SignatureManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a hex signature into a recoverable signature.
///
/// Accepts 65-byte `r || s || v` (v in 0/1, 27/28, or an EIP-155 value >= 35)
/// and 64-byte EIP-2098 `r || yParityAndS`, as `0x`-prefixed hex.
fn parse_signature(signature: &str) -> Result<RecoverableSignature, VerificationError> {
    let digits = signature.strip_prefix("0x").ok_or_else(|| {
        VerificationError::InvalidSignature("Invalid signature hex: missing 0x prefix".to_string())
    })?;
    let bytes = hex::decode(digits)
        .map_err(|e| VerificationError::InvalidSignature(format!("Invalid signature hex: {}", e)))?;

    let (compact, parity) = match bytes.len() {
        65 => {
            if bytes[32] & 0x80 != 0 {
                return Err(VerificationError::InvalidSignature(
                    "non-canonical s".to_string(),
                ));
            }
            let mut compact = [0u8; 64];
            compact.copy_from_slice(&bytes[..64]);
            (compact, normalize_recovery_byte(bytes[64])?)
        }
        64 => {
            let mut compact = [0u8; 64];
            compact.copy_from_slice(&bytes);
            let parity = compact[32] >> 7;
            compact[32] &= 0x7f;
            (compact, parity)
        }
        other => return Err(VerificationError::invalid_signature_length(other)),
    };

    let recovery_id = RecoveryId::from_i32(parity as i32)?;
    Ok(RecoverableSignature::from_compact(&compact, recovery_id)?)
}

/// Map a signature's `v` byte to a recovery parity of 0 or 1.
fn normalize_recovery_byte(v: u8) -> Result<u8, VerificationError> {
    match v {
        0 | 1 => Ok(v),
        27 | 28 => Ok(v - 27),
        // EIP-155: v = chain_id * 2 + 35 + parity
        v if v >= 35 => Ok(if v & 1 == 1 { 0 } else { 1 }),
        v => Err(VerificationError::invalid_recovery_byte(v)),
    }
}
