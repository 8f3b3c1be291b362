//! `"{version}:{base64(signature)}"` signature wire format

use std::fmt;
use std::str::FromStr;

use crate::error::{CryptoError, Result};

/// A versioned signature as carried in a proof
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureEnvelope {
    /// Protocol version that determines the signed message
    pub version: u32,
    /// Raw signature bytes
    pub bytes: Vec<u8>,
}

impl SignatureEnvelope {
    pub fn new(version: u32, bytes: Vec<u8>) -> Self {
        Self { version, bytes }
    }
}

impl FromStr for SignatureEnvelope {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self> {
        let (version, encoded) = s
            .split_once(':')
            .ok_or_else(|| CryptoError::InvalidSignature("missing version prefix".to_string()))?;

        let version = version
            .parse::<u32>()
            .map_err(|_| CryptoError::InvalidSignature(format!("invalid version '{}'", version)))?;

        let bytes = base64::decode(encoded)
            .map_err(|e| CryptoError::InvalidSignature(format!("invalid base64: {}", e)))?;

        Ok(Self { version, bytes })
    }
}

impl fmt::Display for SignatureEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.version, base64::encode(&self.bytes))
    }
}
