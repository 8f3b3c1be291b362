//! Protocol documents
//!
//! Every document is a JSON object carrying its own fields plus an
//! `authorship` block and a `proof`. [`Signed`] splits the two apart while
//! keeping the raw object, since the signature covers the bytes as authored
//! rather than a re-serialization of the typed fields.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use voty_common::types::validate_did;
use voty_common::{Authorship, Error, Proof, Result};

pub mod canonical;
pub mod community;
pub mod proposal;
pub mod proposal_option;
pub mod vote;

pub use canonical::canonical_json;
pub use community::{Community, Group, GroupDuration, GroupPermission};
pub use proposal::{Proposal, VotingType};
pub use proposal_option::ProposalOption;
pub use vote::Vote;

/// Structural checks a document can make on its own
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// A parsed document with its authorship and proof, not yet verified
#[derive(Debug, Clone, PartialEq)]
pub struct Signed<T> {
    pub document: T,
    pub authorship: Authorship,
    pub proof: Proof,
    raw: Map<String, Value>,
}

impl<T: DeserializeOwned + Validate> Signed<T> {
    /// Parse and structurally validate a document
    pub fn from_value(value: Value) -> Result<Self> {
        let raw = match value {
            Value::Object(map) => map,
            other => {
                return Err(Error::schema(format!(
                    "document must be a JSON object, got {}",
                    type_name(&other)
                )))
            }
        };

        let authorship: Authorship = field(&raw, "authorship")?;
        let proof: Proof = field(&raw, "proof")?;
        validate_did(&authorship.author)?;

        let mut body = raw.clone();
        body.remove("authorship");
        body.remove("proof");
        let document: T = serde_json::from_value(Value::Object(body))
            .map_err(|e| Error::schema(format!("invalid document: {}", e)))?;
        document.validate()?;

        Ok(Self {
            document,
            authorship,
            proof,
            raw,
        })
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| Error::schema(format!("invalid JSON: {}", e)))?;
        Self::from_value(value)
    }
}

impl<T> Signed<T> {
    /// The document as authored, without its proof
    pub fn unsigned_value(&self) -> Value {
        let mut unsigned = self.raw.clone();
        unsigned.remove("proof");
        Value::Object(unsigned)
    }

    /// Bytes covered by the proof
    pub fn signing_payload(&self) -> Vec<u8> {
        canonical_json(&self.unsigned_value())
    }

    /// The full document as received
    pub fn to_value(&self) -> Value {
        Value::Object(self.raw.clone())
    }
}

fn field<F: DeserializeOwned>(raw: &Map<String, Value>, name: &str) -> Result<F> {
    let value = raw
        .get(name)
        .ok_or_else(|| Error::schema(format!("missing '{}'", name)))?;
    serde_json::from_value(value.clone())
        .map_err(|e| Error::schema(format!("invalid '{}': {}", name, e)))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Reject empty or whitespace-only text fields
pub(crate) fn require_text(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::schema(format!("'{}' must not be empty", name)));
    }
    Ok(())
}
