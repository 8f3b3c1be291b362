//! Per-suffix DID checkers

use async_trait::async_trait;

use voty_common::{CoinType, Proof, Result};

/// Decides whether a proof address controls a DID at a snapshot
#[async_trait]
pub trait DidChecker: Send + Sync {
    /// DID suffix handled by this checker, without the leading dot
    fn suffix(&self) -> &str;

    /// Coin type the authorship snapshot must refer to
    fn required_coin_type(&self) -> CoinType;

    /// Whether `proof.address` controls `did` as of `snapshot`. A DID that
    /// did not exist at the snapshot is `Ok(false)`; index failures are
    /// errors.
    async fn check(&self, did: &str, snapshot: &str, testnet: bool, proof: &Proof)
        -> Result<bool>;
}
