//! `.bit` accounts
//!
//! A `.bit` account lives on CKB and has an owner and a manager, each with a
//! signing algorithm. The account is controlled by an address if either role
//! holds it under an EVM algorithm.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use voty_common::{coin_types, CoinType, Error, Proof, Result};
use voty_crypto::addresses_equal;

use crate::checker::DidChecker;

/// `.bit` algorithm ids whose keys are Ethereum addresses
pub const EVM_ALGORITHM_IDS: [u32; 2] = [3, 5];

/// Owner and manager of a `.bit` account at some block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitPermission {
    pub owner: String,
    pub owner_algorithm_id: u32,
    pub manager: String,
    pub manager_algorithm_id: u32,
}

impl BitPermission {
    /// Permission where an EVM address is both owner and manager
    pub fn evm(address: impl Into<String>) -> Self {
        let address = address.into();
        Self {
            owner: address.clone(),
            owner_algorithm_id: EVM_ALGORITHM_IDS[1],
            manager: address,
            manager_algorithm_id: EVM_ALGORITHM_IDS[1],
        }
    }

    /// Whether `address` is the manager or the owner under an EVM algorithm
    pub fn is_controlled_by(&self, address: &str) -> bool {
        let holds = |holder: &str, algorithm_id: u32| {
            EVM_ALGORITHM_IDS.contains(&algorithm_id) && addresses_equal(holder, address)
        };
        holds(&self.manager, self.manager_algorithm_id)
            || holds(&self.owner, self.owner_algorithm_id)
    }
}

/// Historical index of `.bit` account permissions
#[async_trait]
pub trait BitSnapshotIndex: Send + Sync {
    /// Permission of `account` as of `block_number`, `None` if the account
    /// did not exist then
    async fn permission_at(
        &self,
        account: &str,
        block_number: u64,
        testnet: bool,
    ) -> Result<Option<BitPermission>>;
}

/// Checker for `.bit` DIDs
pub struct BitDidChecker {
    index: Arc<dyn BitSnapshotIndex>,
}

impl BitDidChecker {
    pub fn new(index: Arc<dyn BitSnapshotIndex>) -> Self {
        Self { index }
    }
}

#[async_trait]
impl DidChecker for BitDidChecker {
    fn suffix(&self) -> &str {
        "bit"
    }

    fn required_coin_type(&self) -> CoinType {
        coin_types::CKB
    }

    async fn check(&self, did: &str, snapshot: &str, testnet: bool, proof: &Proof) -> Result<bool> {
        let block_number = snapshot.parse::<u64>().map_err(|_| {
            Error::schema(format!("CKB snapshot '{}' is not a block number", snapshot))
        })?;

        match self.index.permission_at(did, block_number, testnet).await? {
            Some(permission) => {
                let controlled = permission.is_controlled_by(&proof.address);
                debug!(
                    "{} at block {} controlled by {}: {}",
                    did, block_number, proof.address, controlled
                );
                Ok(controlled)
            }
            None => {
                debug!("{} does not exist at block {}", did, block_number);
                Ok(false)
            }
        }
    }
}
