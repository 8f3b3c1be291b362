//! Document signatures
//!
//! The signed bytes are the canonical JSON of the document without its
//! `proof`. Version 0 signs those bytes as they are. Version 1 signs a fixed
//! prompt embedding their SHA-256, which is what wallets show to users.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use voty_common::{Error, Proof, ProofKind, Result};
use voty_crypto::{
    addresses_equal, sha256_hex, EthPersonalSign, RecoverSigner, SignatureEnvelope, Signer,
};

use crate::schema::{canonical_json, Signed};

/// Prompt preceding the payload hash in version 1 messages
pub const V1_MESSAGE_PREFIX: &str = "You are signing for Voty Protocol.\n\nhash: 0x";

/// Signing protocol version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProofVersion {
    /// Raw canonical bytes
    V0,
    /// Prompt with the SHA-256 of the canonical bytes
    V1,
}

impl ProofVersion {
    pub fn as_u32(&self) -> u32 {
        match self {
            ProofVersion::V0 => 0,
            ProofVersion::V1 => 1,
        }
    }
}

impl TryFrom<u32> for ProofVersion {
    type Error = Error;

    fn try_from(version: u32) -> Result<Self> {
        match version {
            0 => Ok(ProofVersion::V0),
            1 => Ok(ProofVersion::V1),
            other => Err(Error::invalid_proof(format!(
                "unsupported signature version {}",
                other
            ))),
        }
    }
}

/// Message actually signed for `payload`
pub fn signing_message(payload: &[u8], version: ProofVersion) -> Vec<u8> {
    match version {
        ProofVersion::V0 => payload.to_vec(),
        ProofVersion::V1 => format!("{}{}", V1_MESSAGE_PREFIX, sha256_hex(payload)).into_bytes(),
    }
}

fn without_proof(document: &Value) -> Value {
    let mut document = document.clone();
    if let Value::Object(map) = &mut document {
        map.remove("proof");
    }
    document
}

/// Checks that a proof's signature recovers to its claimed address
#[derive(Clone)]
pub struct ProofVerifier {
    recover: Arc<dyn RecoverSigner>,
}

impl ProofVerifier {
    pub fn new(recover: Arc<dyn RecoverSigner>) -> Self {
        Self { recover }
    }

    /// Whether `proof` signs `payload`. Malformed signatures are `Ok(false)`;
    /// only an unknown proof kind is an error.
    pub fn verify_payload(&self, payload: &[u8], proof: &Proof) -> Result<bool> {
        match proof.proof_kind()? {
            ProofKind::EthPersonalSign => {}
        }

        let envelope: SignatureEnvelope = match proof.signature.parse() {
            Ok(envelope) => envelope,
            Err(e) => {
                debug!("Malformed signature: {}", e);
                return Ok(false);
            }
        };
        let version = match ProofVersion::try_from(envelope.version) {
            Ok(version) => version,
            Err(e) => {
                debug!("{}", e);
                return Ok(false);
            }
        };

        let message = signing_message(payload, version);
        match self.recover.recover(&message, &envelope.bytes) {
            Ok(recovered) => {
                let valid = addresses_equal(&recovered, &proof.address);
                if !valid {
                    debug!("Signature recovers to {}, proof claims {}", recovered, proof.address);
                }
                Ok(valid)
            }
            Err(e) => {
                debug!("Signer recovery failed: {}", e);
                Ok(false)
            }
        }
    }

    /// Whether `proof` signs `document`. A `proof` key inside `document` is
    /// ignored.
    pub fn verify_document(&self, document: &Value, proof: &Proof) -> Result<bool> {
        self.verify_payload(&canonical_json(&without_proof(document)), proof)
    }

    pub fn verify_signed<T>(&self, signed: &Signed<T>) -> Result<bool> {
        self.verify_payload(&signed.signing_payload(), &signed.proof)
    }
}

impl Default for ProofVerifier {
    fn default() -> Self {
        Self::new(Arc::new(EthPersonalSign))
    }
}

/// Sign `document` (including its `authorship`) with `signer`
pub fn sign_document(document: &Value, signer: &dyn Signer, version: ProofVersion) -> Result<Proof> {
    let payload = canonical_json(&without_proof(document));
    let signature = signer.sign_message(&signing_message(&payload, version))?;

    Ok(Proof {
        kind: ProofKind::EthPersonalSign.as_str().to_string(),
        address: signer.address(),
        signature: SignatureEnvelope::new(version.as_u32(), signature).to_string(),
    })
}

/// `document` with a fresh `proof` attached
pub fn seal_document(document: Value, signer: &dyn Signer, version: ProofVersion) -> Result<Value> {
    let proof = sign_document(&document, signer, version)?;
    let proof = serde_json::to_value(proof).map_err(|e| Error::schema(e.to_string()))?;

    match document {
        Value::Object(mut map) => {
            map.insert("proof".to_string(), proof);
            Ok(Value::Object(map))
        }
        _ => Err(Error::schema("document must be a JSON object")),
    }
}
