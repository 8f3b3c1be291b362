//! Identity, snapshot and proof types shared by every Voty crate

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Integer identifier of a chain / address namespace (SLIP-44 numbering)
pub type CoinType = u32;

/// Well known coin types
pub mod coin_types {
    use super::CoinType;

    /// Ethereum
    pub const ETH: CoinType = 60;
    /// Nervos CKB, home chain of `.bit` accounts
    pub const CKB: CoinType = 309;
}

/// Coin type -> opaque block reference (e.g. a CKB block number)
pub type Snapshots = BTreeMap<CoinType, String>;

/// The claimed identity and the historical point it is asserted at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authorship {
    /// DID of the author, e.g. `alice.bit`
    pub author: String,
    /// Coin type the snapshot belongs to
    pub coin_type: CoinType,
    /// Block reference on that chain
    pub snapshot: String,
    /// Whether the snapshot refers to a testnet
    #[serde(default)]
    pub testnet: bool,
}

/// Signature proof attached to a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    /// Proof kind, kept as a string so unknown kinds surface as
    /// [`Error::UnsupportedProofKind`] instead of a schema failure
    #[serde(rename = "type")]
    pub kind: String,
    /// Address the signer claims to control
    pub address: String,
    /// `"{version}:{base64(signature)}"`
    pub signature: String,
}

impl Proof {
    /// Parse the proof kind
    pub fn proof_kind(&self) -> Result<ProofKind> {
        self.kind.parse()
    }
}

/// Recognized proof kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProofKind {
    /// EIP-191 `personal_sign` over the canonical message
    EthPersonalSign,
}

impl ProofKind {
    /// Wire name of the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            ProofKind::EthPersonalSign => "eth_personal_sign",
        }
    }
}

impl FromStr for ProofKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "eth_personal_sign" => Ok(ProofKind::EthPersonalSign),
            other => Err(Error::UnsupportedProofKind(other.to_string())),
        }
    }
}

impl fmt::Display for ProofKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Suffix of a `<label>.<suffix>` DID, `None` if the DID is malformed
pub fn did_suffix(did: &str) -> Option<&str> {
    let (label, suffix) = did.rsplit_once('.')?;
    if label.is_empty() || suffix.is_empty() {
        return None;
    }
    Some(suffix)
}

/// Validate the `<label>.<suffix>` shape of a DID
pub fn validate_did(did: &str) -> Result<()> {
    if did.chars().any(char::is_whitespace) {
        return Err(Error::schema(format!("DID '{}' contains whitespace", did)));
    }
    did_suffix(did)
        .map(|_| ())
        .ok_or_else(|| Error::schema(format!("DID '{}' is not of the form <label>.<suffix>", did)))
}
