//! In-memory `.bit` permission index for tests and offline tooling

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;

use voty_common::{Error, Result};

use crate::bit::{BitPermission, BitSnapshotIndex};

/// Permission history per account, keyed by the block each entry takes
/// effect from. Testnet and mainnet share the same history.
#[derive(Debug, Clone, Default)]
pub struct MemoryBitIndex {
    history: HashMap<String, BTreeMap<u64, BitPermission>>,
    unavailable: bool,
}

impl MemoryBitIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index whose every lookup fails with `Error::OracleUnavailable`
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// Record that `account` has `permission` from `from_block` on
    pub fn with_permission(
        mut self,
        account: impl Into<String>,
        from_block: u64,
        permission: BitPermission,
    ) -> Self {
        self.history
            .entry(account.into())
            .or_default()
            .insert(from_block, permission);
        self
    }
}

#[async_trait]
impl BitSnapshotIndex for MemoryBitIndex {
    async fn permission_at(
        &self,
        account: &str,
        block_number: u64,
        _testnet: bool,
    ) -> Result<Option<BitPermission>> {
        if self.unavailable {
            return Err(Error::oracle("bit snapshot index unavailable"));
        }

        Ok(self.history.get(account).and_then(|history| {
            history
                .range(..=block_number)
                .next_back()
                .map(|(_, permission)| permission.clone())
        }))
    }
}
