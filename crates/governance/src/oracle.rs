//! Fixed snapshot oracle for tests and offline tooling

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use voty_common::{CoinType, Error, Result, SnapshotOracle};

/// [`SnapshotOracle`] answering from preset tables. Testnet and mainnet
/// share the same tables.
#[derive(Debug, Clone, Default)]
pub struct StaticSnapshotOracle {
    current: HashMap<CoinType, String>,
    timestamps: HashMap<(CoinType, String), DateTime<Utc>>,
}

impl StaticSnapshotOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_current(mut self, coin_type: CoinType, snapshot: impl Into<String>) -> Self {
        self.current.insert(coin_type, snapshot.into());
        self
    }

    pub fn with_timestamp(
        mut self,
        coin_type: CoinType,
        snapshot: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        self.timestamps.insert((coin_type, snapshot.into()), timestamp);
        self
    }
}

#[async_trait]
impl SnapshotOracle for StaticSnapshotOracle {
    async fn current_snapshot(&self, coin_type: CoinType, _testnet: bool) -> Result<String> {
        self.current
            .get(&coin_type)
            .cloned()
            .ok_or(Error::ChainDataUnavailable(coin_type))
    }

    async fn snapshot_timestamp(
        &self,
        coin_type: CoinType,
        snapshot: &str,
        _testnet: bool,
    ) -> Result<DateTime<Utc>> {
        self.timestamps
            .get(&(coin_type, snapshot.to_string()))
            .copied()
            .ok_or_else(|| {
                Error::not_found(format!("snapshot {} of coin type {}", snapshot, coin_type))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use voty_common::coin_types;
    use voty_policy::fetch_snapshots;

    #[tokio::test]
    async fn test_fetch_snapshots_reads_current_tips() {
        let oracle = StaticSnapshotOracle::new()
            .with_current(coin_types::CKB, "1000")
            .with_current(coin_types::ETH, "19000000");

        let wanted: BTreeSet<CoinType> = [coin_types::CKB, coin_types::ETH].into_iter().collect();
        let snapshots = fetch_snapshots(&wanted, &oracle, false, 2).await.unwrap();
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots.get(&coin_types::CKB).map(String::as_str), Some("1000"));
        assert_eq!(snapshots.get(&coin_types::ETH).map(String::as_str), Some("19000000"));
    }

    #[tokio::test]
    async fn test_missing_tip_is_chain_data_unavailable() {
        let oracle = StaticSnapshotOracle::new().with_current(coin_types::CKB, "1000");

        let wanted: BTreeSet<CoinType> = [coin_types::CKB, coin_types::ETH].into_iter().collect();
        assert!(matches!(
            fetch_snapshots(&wanted, &oracle, false, 2).await,
            Err(Error::ChainDataUnavailable(c)) if c == coin_types::ETH
        ));
    }
}
