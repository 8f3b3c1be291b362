//! Interfaces to the external collaborators the engine consumes
//!
//! Chain oracles and the blob store are the only sources of I/O. Their
//! failures are reported as [`Error::OracleUnavailable`] / [`Error::Storage`]
//! so callers can tell them apart from verification failures.
//!
//! [`Error::OracleUnavailable`]: crate::Error::OracleUnavailable
//! [`Error::Storage`]: crate::Error::Storage

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::types::CoinType;

/// Provider of chain heights and block timestamps per coin type
#[async_trait]
pub trait SnapshotOracle: Send + Sync {
    /// Current block reference of the chain
    async fn current_snapshot(&self, coin_type: CoinType, testnet: bool) -> Result<String>;

    /// Wall-clock time of a block reference; `Error::NotFound` if the block
    /// does not exist (yet)
    async fn snapshot_timestamp(
        &self,
        coin_type: CoinType,
        snapshot: &str,
        testnet: bool,
    ) -> Result<DateTime<Utc>>;
}

/// Content-addressed document store keyed by opaque permalinks
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Fetch a blob, `None` if the permalink is unknown
    async fn get(&self, permalink: &str) -> Result<Option<Vec<u8>>>;

    /// Store a blob and return its permalink
    async fn put(&self, data: &[u8]) -> Result<String>;
}
