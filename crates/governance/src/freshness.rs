//! Snapshot freshness
//!
//! An authorship snapshot may only be used while it is at most one
//! staleness window old. The bound is inclusive.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::debug;

use voty_common::{Authorship, Error, Result, SnapshotOracle, VerifierConfig};

use crate::timeout::within;

/// Fail with `Error::StaleSnapshot` if `snapshot_time` is more than
/// `window` before `now`. Snapshots from the future count as fresh.
pub fn check_freshness(
    snapshot_time: DateTime<Utc>,
    now: DateTime<Utc>,
    window: chrono::Duration,
) -> Result<()> {
    let age = now.signed_duration_since(snapshot_time);
    if age > window {
        return Err(Error::StaleSnapshot(format!(
            "snapshot taken at {} is {}s old, limit is {}s",
            snapshot_time.to_rfc3339(),
            age.num_seconds(),
            window.num_seconds()
        )));
    }
    Ok(())
}

/// Resolves authorship snapshots to wall-clock time and applies
/// [`check_freshness`]
#[derive(Clone)]
pub struct SnapshotFreshnessGuard {
    oracle: Arc<dyn SnapshotOracle>,
    window: chrono::Duration,
    timeout: Duration,
}

impl SnapshotFreshnessGuard {
    pub fn new(oracle: Arc<dyn SnapshotOracle>, window: chrono::Duration, timeout: Duration) -> Self {
        Self {
            oracle,
            window,
            timeout,
        }
    }

    pub fn from_config(oracle: Arc<dyn SnapshotOracle>, config: &VerifierConfig) -> Self {
        Self::new(oracle, config.staleness_window(), config.oracle_timeout())
    }

    pub fn window(&self) -> chrono::Duration {
        self.window
    }

    /// Wall-clock time of the authorship snapshot
    pub async fn snapshot_time(&self, authorship: &Authorship) -> Result<DateTime<Utc>> {
        within(
            self.timeout,
            "snapshot timestamp lookup",
            Error::OracleUnavailable,
            self.oracle.snapshot_timestamp(
                authorship.coin_type,
                &authorship.snapshot,
                authorship.testnet,
            ),
        )
        .await
    }

    pub async fn verify_snapshot_freshness(
        &self,
        authorship: &Authorship,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let snapshot_time = self.snapshot_time(authorship).await?;
        debug!(
            "Snapshot {} of coin type {} taken at {}",
            authorship.snapshot, authorship.coin_type, snapshot_time
        );
        check_freshness(snapshot_time, now, self.window)
    }
}
