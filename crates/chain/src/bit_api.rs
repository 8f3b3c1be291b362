//! Client for the `.bit` snapshot API
//!
//! `POST {base}/v1/snapshot/permission/info` with `{account, block_number}`
//! answers `{err_no, err_msg, data}` where `data` carries the owner and
//! manager of the account at that block.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use voty_common::{ChainConfig, Error, Result};
use voty_identity::{BitPermission, BitSnapshotIndex};

use crate::client::{build_client, post_json};

/// `err_no` reported for accounts that are not registered
const ERR_ACCOUNT_NOT_EXIST: i64 = 20007;

#[derive(Debug, Deserialize)]
struct ApiResponse {
    err_no: i64,
    #[serde(default)]
    err_msg: String,
    data: Option<BitPermission>,
}

/// [`BitSnapshotIndex`] backed by the `.bit` snapshot API
#[derive(Debug, Clone)]
pub struct DidSnapshotApi {
    client: reqwest::Client,
    mainnet_url: String,
    testnet_url: String,
}

impl DidSnapshotApi {
    pub fn new(
        mainnet_url: impl Into<String>,
        testnet_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            mainnet_url: mainnet_url.into(),
            testnet_url: testnet_url.into(),
        })
    }

    pub fn from_config(config: &ChainConfig, timeout: Duration) -> Result<Self> {
        Self::new(&config.bit_snapshot_url, &config.bit_testnet_snapshot_url, timeout)
    }
}

#[async_trait]
impl BitSnapshotIndex for DidSnapshotApi {
    async fn permission_at(
        &self,
        account: &str,
        block_number: u64,
        testnet: bool,
    ) -> Result<Option<BitPermission>> {
        let base = if testnet {
            &self.testnet_url
        } else {
            &self.mainnet_url
        };
        let url = format!("{}/v1/snapshot/permission/info", base.trim_end_matches('/'));
        let response: ApiResponse = post_json(
            &self.client,
            &url,
            &json!({ "account": account, "block_number": block_number }),
        )
        .await?;

        match response.err_no {
            0 => {
                debug!("{} at block {}: {:?}", account, block_number, response.data);
                Ok(response.data)
            }
            ERR_ACCOUNT_NOT_EXIST => Ok(None),
            code => Err(Error::oracle(format!(
                ".bit snapshot API error {}: {}",
                code, response.err_msg
            ))),
        }
    }
}
