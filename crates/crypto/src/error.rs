//! Error types for cryptographic operations

use thiserror::Error;
use voty_common::Error as CommonError;

/// Error type for cryptographic operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Invalid key
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Invalid signature
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    /// Invalid address
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Signing failed
    #[error("Signing failed: {0}")]
    SigningFailed(String),
}

impl From<CryptoError> for CommonError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::InvalidKey(msg)
            | CryptoError::InvalidSignature(msg)
            | CryptoError::InvalidAddress(msg)
            | CryptoError::SigningFailed(msg) => CommonError::invalid_proof(msg),
        }
    }
}

/// Result type for cryptographic operations
pub type Result<T> = std::result::Result<T, CryptoError>;
