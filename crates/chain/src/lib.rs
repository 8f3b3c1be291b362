//! Live chain oracles for Voty
//!
//! HTTP implementations of the oracle seams: CKB block heights and
//! timestamps, and the historical `.bit` permission index.

mod client;

pub mod bit_api;
pub mod ckb;

use std::sync::Arc;

use voty_common::{Result, VerifierConfig};
use voty_identity::{BitDidChecker, DidRegistry};

pub use bit_api::DidSnapshotApi;
pub use ckb::CkbRpcOracle;

/// DID registry with every checker backed by a live index
pub fn did_registry(config: &VerifierConfig) -> Result<DidRegistry> {
    let bit_index = DidSnapshotApi::from_config(&config.chain, config.oracle_timeout())?;
    Ok(DidRegistry::new().with_checker(Arc::new(BitDidChecker::new(Arc::new(bit_index)))))
}

/// Snapshot oracle for every supported chain
pub fn snapshot_oracle(config: &VerifierConfig) -> Result<CkbRpcOracle> {
    CkbRpcOracle::from_config(&config.chain, config.oracle_timeout())
}
