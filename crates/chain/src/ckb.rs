//! CKB JSON-RPC snapshot oracle
//!
//! Snapshots on CKB are block numbers written in decimal. The node speaks
//! hex quantities, so conversion happens at this boundary.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use voty_common::{coin_types, ChainConfig, CoinType, Error, Result, SnapshotOracle};

use crate::client::{build_client, post_json};

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct Header {
    timestamp: String,
}

/// [`SnapshotOracle`] for coin type 309 backed by CKB nodes
#[derive(Debug, Clone)]
pub struct CkbRpcOracle {
    client: reqwest::Client,
    mainnet_url: String,
    testnet_url: String,
}

impl CkbRpcOracle {
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
        Self::new(&config.ckb_rpc_url, &config.ckb_testnet_rpc_url, timeout)
    }

    fn url(&self, testnet: bool) -> &str {
        if testnet {
            &self.testnet_url
        } else {
            &self.mainnet_url
        }
    }

    async fn call<T: for<'de> Deserialize<'de>>(
        &self,
        testnet: bool,
        method: &str,
        params: Value,
    ) -> Result<Option<T>> {
        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });
        let response: RpcResponse<T> = post_json(&self.client, self.url(testnet), &request).await?;

        if let Some(error) = response.error {
            return Err(Error::oracle(format!(
                "CKB {} failed ({}): {}",
                method, error.code, error.message
            )));
        }
        Ok(response.result)
    }
}

fn ensure_ckb(coin_type: CoinType) -> Result<()> {
    if coin_type != coin_types::CKB {
        return Err(Error::ChainDataUnavailable(coin_type));
    }
    Ok(())
}

fn parse_hex_quantity(value: &str) -> Result<u64> {
    value
        .strip_prefix("0x")
        .and_then(|digits| u64::from_str_radix(digits, 16).ok())
        .ok_or_else(|| Error::oracle(format!("invalid hex quantity from CKB: {}", value)))
}

#[async_trait]
impl SnapshotOracle for CkbRpcOracle {
    async fn current_snapshot(&self, coin_type: CoinType, testnet: bool) -> Result<String> {
        ensure_ckb(coin_type)?;

        let tip: String = self
            .call(testnet, "get_tip_block_number", json!([]))
            .await?
            .ok_or_else(|| Error::oracle("CKB returned no tip block number"))?;
        let block_number = parse_hex_quantity(&tip)?;

        debug!("CKB tip block is {}", block_number);
        Ok(block_number.to_string())
    }

    async fn snapshot_timestamp(
        &self,
        coin_type: CoinType,
        snapshot: &str,
        testnet: bool,
    ) -> Result<DateTime<Utc>> {
        ensure_ckb(coin_type)?;
        let block_number = snapshot.parse::<u64>().map_err(|_| {
            Error::schema(format!("CKB snapshot '{}' is not a block number", snapshot))
        })?;

        let header: Header = self
            .call(
                testnet,
                "get_header_by_number",
                json!([format!("{:#x}", block_number)]),
            )
            .await?
            .ok_or_else(|| Error::not_found(format!("CKB block {}", block_number)))?;

        let millis = parse_hex_quantity(&header.timestamp)?;
        let millis = i64::try_from(millis)
            .map_err(|_| Error::oracle(format!("CKB timestamp out of range: {}", millis)))?;

        Utc.timestamp_millis_opt(millis)
            .single()
            .ok_or_else(|| Error::oracle(format!("CKB timestamp out of range: {}", millis)))
    }
}
