//! EIP-191 `personal_sign` signing and signer recovery

use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};

use crate::address::address_of;
use crate::error::{CryptoError, Result};
use crate::hash::keccak256;

/// Length of an `r || s || v` signature
pub const SIGNATURE_LENGTH: usize = 65;

/// Digest signed by `personal_sign`:
/// `keccak256("\x19Ethereum Signed Message:\n" + len(message) + message)`
pub fn personal_message_hash(message: &[u8]) -> [u8; 32] {
    let mut data = format!("\x19Ethereum Signed Message:\n{}", message.len()).into_bytes();
    data.extend_from_slice(message);
    keccak256(&data)
}

/// Primitive that recovers the signer address of a message signature
pub trait RecoverSigner: Send + Sync {
    /// Recover the EIP-55 address that produced `signature` over `message`
    fn recover(&self, message: &[u8], signature: &[u8]) -> Result<String>;
}

/// Recovery for `personal_sign` signatures
#[derive(Debug, Clone, Copy, Default)]
pub struct EthPersonalSign;

impl RecoverSigner for EthPersonalSign {
    fn recover(&self, message: &[u8], signature: &[u8]) -> Result<String> {
        if signature.len() != SIGNATURE_LENGTH {
            return Err(CryptoError::InvalidSignature(format!(
                "expected {} bytes, got {}",
                SIGNATURE_LENGTH,
                signature.len()
            )));
        }

        let v = match signature[64] {
            27 | 28 => signature[64] - 27,
            0 | 1 => signature[64],
            other => {
                return Err(CryptoError::InvalidSignature(format!(
                    "invalid recovery byte {}",
                    other
                )))
            }
        };
        let mut recovery_id = RecoveryId::from_byte(v)
            .ok_or_else(|| CryptoError::InvalidSignature(format!("invalid recovery id {}", v)))?;

        let mut sig = Signature::from_slice(&signature[..64])
            .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;
        // Some wallets emit high-S signatures; k256 only verifies low-S
        if let Some(normalized) = sig.normalize_s() {
            sig = normalized;
            recovery_id = RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced());
        }

        let digest = personal_message_hash(message);
        let key = VerifyingKey::recover_from_prehash(&digest, &sig, recovery_id)
            .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;

        Ok(address_of(&key))
    }
}

/// Capability that signs messages on behalf of an address
pub trait Signer: Send + Sync {
    /// EIP-55 address of the signer
    fn address(&self) -> String;

    /// Produce a 65 byte `personal_sign` signature over `message`
    fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>>;
}

/// Signer backed by an in-process secp256k1 key
pub struct LocalSigner {
    key: SigningKey,
}

impl LocalSigner {
    /// Create a signer from a 32 byte secret key
    pub fn from_slice(secret: &[u8]) -> Result<Self> {
        let key = SigningKey::from_slice(secret)
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        Ok(Self { key })
    }

    /// Create a signer from a hex encoded secret key, `0x` prefix optional
    pub fn from_hex(secret: &str) -> Result<Self> {
        let bytes = hex::decode(secret.trim_start_matches("0x"))
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        Self::from_slice(&bytes)
    }
}

impl Signer for LocalSigner {
    fn address(&self) -> String {
        address_of(self.key.verifying_key())
    }

    fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>> {
        let digest = personal_message_hash(message);
        let (signature, recovery_id) = self
            .key
            .sign_prehash_recoverable(&digest)
            .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;

        let mut bytes = Vec::with_capacity(SIGNATURE_LENGTH);
        bytes.extend_from_slice(&signature.to_bytes());
        bytes.push(27 + recovery_id.to_byte());
        Ok(bytes)
    }
}

impl std::fmt::Debug for LocalSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LocalSigner({})", self.address())
    }
}
