//! Leaf functions of policy trees
//!
//! Each function validates its own arguments and declares the coin types it
//! needs snapshots for. The evaluator checks those snapshots are present
//! before calling it.

use std::collections::BTreeSet;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;

use voty_common::{CoinType, Result, Snapshots};

mod prefixes_dot_suffix;

pub use prefixes_dot_suffix::{
    prefixes_dot_suffix_matches, PrefixesDotSuffixExactMatch, PrefixesDotSuffixFixedPower,
};

/// Function deciding whether a DID may act
#[async_trait]
pub trait BooleanFunction: Send + Sync {
    /// Registered name
    fn name(&self) -> &'static str;

    /// Reject malformed arguments before evaluation
    fn validate_arguments(&self, arguments: &[Value]) -> Result<()>;

    /// Coin types whose snapshots the function reads
    fn required_coin_types(&self, arguments: &[Value]) -> Result<BTreeSet<CoinType>>;

    /// Evaluate for a DID against the given snapshots
    async fn check(&self, arguments: &[Value], did: &str, snapshots: &Snapshots) -> Result<bool>;
}

/// Function computing the arbitrary-precision voting power of a DID
#[async_trait]
pub trait DecimalFunction: Send + Sync {
    /// Registered name
    fn name(&self) -> &'static str;

    /// Reject malformed arguments before evaluation
    fn validate_arguments(&self, arguments: &[Value]) -> Result<()>;

    /// Coin types whose snapshots the function reads
    fn required_coin_types(&self, arguments: &[Value]) -> Result<BTreeSet<CoinType>>;

    /// Evaluate for a DID against the given snapshots
    async fn calculate(
        &self,
        arguments: &[Value],
        did: &str,
        snapshots: &Snapshots,
    ) -> Result<Decimal>;
}

/// Legacy floating-point variant of [`DecimalFunction`]
#[async_trait]
pub trait NumberFunction: Send + Sync {
    /// Registered name
    fn name(&self) -> &'static str;

    /// Reject malformed arguments before evaluation
    fn validate_arguments(&self, arguments: &[Value]) -> Result<()>;

    /// Coin types whose snapshots the function reads
    fn required_coin_types(&self, arguments: &[Value]) -> Result<BTreeSet<CoinType>>;

    /// Evaluate for a DID against the given snapshots
    async fn calculate(&self, arguments: &[Value], did: &str, snapshots: &Snapshots)
        -> Result<f64>;
}
