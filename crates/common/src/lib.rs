//! Common types, errors and interfaces for Voty
//!
//! Shared by the policy engine, the DID checkers and the document
//! verification pipeline.

pub mod config;
pub mod error;
pub mod interfaces;
pub mod logging;
pub mod types;

pub use config::{ChainConfig, Configuration, VerifierConfig};
pub use error::{Error, Result};
pub use interfaces::{BlobStore, SnapshotOracle};
pub use types::{coin_types, Authorship, CoinType, Proof, ProofKind, Snapshots};
