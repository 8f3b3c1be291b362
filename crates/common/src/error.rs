//! Error types for Voty
//!
//! Every failure the engine can report maps to one variant here. Verification
//! failures are final; only [`Error::is_transient`] failures may be retried.

use thiserror::Error;

use crate::types::CoinType;

/// Common result type used throughout Voty
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for policy evaluation and document verification
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The payload failed structural or type validation
    #[error("Schema error: {0}")]
    Schema(String),

    /// The authorship snapshot is older than the staleness window
    #[error("Stale snapshot: {0}")]
    StaleSnapshot(String),

    /// The signature does not recover to the claimed address
    #[error("Invalid proof: {0}")]
    InvalidProof(String),

    /// The proof address does not control the DID at the snapshot
    #[error("Invalid authorship: {0}")]
    InvalidAuthorship(String),

    /// The authorship coin type does not match the DID checker
    #[error("Coin type mismatch: expected {expected}, got {actual}")]
    CoinTypeMismatch {
        expected: CoinType,
        actual: CoinType,
    },

    /// The proof kind is not recognized
    #[error("Unsupported proof kind: {0}")]
    UnsupportedProofKind(String),

    /// No checker is registered for the DID suffix
    #[error("Unsupported DID: {0}")]
    UnsupportedDid(String),

    /// A policy leaf names a function absent from the registry
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// A combinator has the wrong number of operands
    #[error("Arity error: {0}")]
    Arity(String),

    /// A required coin type is missing from the snapshots map
    #[error("Chain data unavailable for coin type {0}")]
    ChainDataUnavailable(CoinType),

    /// The author is not allowed to perform the action
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// The claimed voting power differs from the computed one
    #[error("Power mismatch: claimed {claimed}, computed {computed}")]
    PowerMismatch { claimed: String, computed: String },

    /// The action is not allowed in the current phase
    #[error("Phase violation: {0}")]
    PhaseViolation(String),

    /// A referenced document or snapshot does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// A chain oracle or index could not be reached
    #[error("Oracle unavailable: {0}")]
    OracleUnavailable(String),

    /// The blob store failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl Error {
    /// Create a new schema error
    pub fn schema<S: Into<String>>(msg: S) -> Self {
        Error::Schema(msg.into())
    }

    /// Create a new invalid proof error
    pub fn invalid_proof<S: Into<String>>(msg: S) -> Self {
        Error::InvalidProof(msg.into())
    }

    /// Create a new invalid authorship error
    pub fn invalid_authorship<S: Into<String>>(msg: S) -> Self {
        Error::InvalidAuthorship(msg.into())
    }

    /// Create a new arity error
    pub fn arity<S: Into<String>>(msg: S) -> Self {
        Error::Arity(msg.into())
    }

    /// Create a new permission denied error
    pub fn permission_denied<S: Into<String>>(msg: S) -> Self {
        Error::PermissionDenied(msg.into())
    }

    /// Create a new phase violation error
    pub fn phase_violation<S: Into<String>>(msg: S) -> Self {
        Error::PhaseViolation(msg.into())
    }

    /// Create a new not found error
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Error::NotFound(msg.into())
    }

    /// Create a new oracle unavailable error
    pub fn oracle<S: Into<String>>(msg: S) -> Self {
        Error::OracleUnavailable(msg.into())
    }

    /// Create a new storage error
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        Error::Storage(msg.into())
    }

    /// Create a new configuration error
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Error::Configuration(msg.into())
    }

    /// Stable code for the API boundary
    pub fn code(&self) -> &'static str {
        match self {
            Error::Schema(_) => "SCHEMA_ERROR",
            Error::StaleSnapshot(_) => "STALE_SNAPSHOT",
            Error::InvalidProof(_) => "INVALID_PROOF",
            Error::InvalidAuthorship(_) => "INVALID_AUTHORSHIP",
            Error::CoinTypeMismatch { .. } => "COIN_TYPE_MISMATCH",
            Error::UnsupportedProofKind(_) => "UNSUPPORTED_PROOF_KIND",
            Error::UnsupportedDid(_) => "UNSUPPORTED_DID",
            Error::UnknownFunction(_) => "UNKNOWN_FUNCTION",
            Error::Arity(_) => "ARITY_ERROR",
            Error::ChainDataUnavailable(_) => "CHAIN_DATA_UNAVAILABLE",
            Error::PermissionDenied(_) => "PERMISSION_DENIED",
            Error::PowerMismatch { .. } => "POWER_MISMATCH",
            Error::PhaseViolation(_) => "PHASE_VIOLATION",
            Error::NotFound(_) => "NOT_FOUND",
            Error::OracleUnavailable(_) => "ORACLE_UNAVAILABLE",
            Error::Storage(_) => "STORAGE_ERROR",
            Error::Configuration(_) => "CONFIGURATION_ERROR",
        }
    }

    /// Whether the failure came from upstream I/O and may be retried
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::OracleUnavailable(_) | Error::Storage(_))
    }
}
