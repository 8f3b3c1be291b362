//! Shared HTTP plumbing

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use voty_common::{Error, Result};

/// HTTP client with a per-request timeout
pub(crate) fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| Error::configuration(format!("Failed to create HTTP client: {}", e)))
}

/// POST `body` as JSON and decode the JSON response. Transport failures,
/// timeouts, non-2xx statuses and undecodable bodies are all
/// `Error::OracleUnavailable`.
pub(crate) async fn post_json<B, T>(client: &reqwest::Client, url: &str, body: &B) -> Result<T>
where
    B: Serialize + ?Sized,
    T: DeserializeOwned,
{
    let response = client.post(url).json(body).send().await.map_err(|e| {
        let reason = if e.is_timeout() { "timed out" } else { "request failed" };
        warn!("POST {} {}: {}", url, reason, e);
        Error::oracle(format!("{} {}: {}", url, reason, e))
    })?;

    let status = response.status();
    if !status.is_success() {
        warn!("POST {} returned {}", url, status);
        return Err(Error::oracle(format!("{} returned {}", url, status)));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| Error::oracle(format!("{} returned an invalid body: {}", url, e)))
}
