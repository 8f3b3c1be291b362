//! Coin types a policy reads, and pre-fetching their snapshots

use std::collections::BTreeSet;

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::debug;

use voty_common::{CoinType, Error, Result, SnapshotOracle, Snapshots};

use crate::expr::{BooleanSets, DecimalSets};
use crate::registry::FunctionRegistry;

/// Union of the coin types required by every leaf of a boolean tree
pub fn required_coin_types_of_boolean_sets(
    expr: &BooleanSets,
    registry: &FunctionRegistry,
) -> Result<BTreeSet<CoinType>> {
    let mut coin_types = BTreeSet::new();
    for (name, arguments) in expr.leaves() {
        coin_types.extend(registry.boolean(name)?.required_coin_types(arguments)?);
    }
    Ok(coin_types)
}

/// Union of the coin types required by every leaf of a decimal tree
pub fn required_coin_types_of_decimal_sets(
    expr: &DecimalSets,
    registry: &FunctionRegistry,
) -> Result<BTreeSet<CoinType>> {
    let mut coin_types = BTreeSet::new();
    for (name, arguments) in expr.leaves() {
        coin_types.extend(registry.decimal(name)?.required_coin_types(arguments)?);
    }
    Ok(coin_types)
}

/// Union of the coin types required by every leaf of a number tree
pub fn required_coin_types_of_number_sets(
    expr: &DecimalSets,
    registry: &FunctionRegistry,
) -> Result<BTreeSet<CoinType>> {
    let mut coin_types = BTreeSet::new();
    for (name, arguments) in expr.leaves() {
        coin_types.extend(registry.number(name)?.required_coin_types(arguments)?);
    }
    Ok(coin_types)
}

/// Fetch the current snapshot of each coin type, with at most `concurrency`
/// oracle calls in flight. Fails with the first oracle error.
pub async fn fetch_snapshots(
    coin_types: &BTreeSet<CoinType>,
    oracle: &dyn SnapshotOracle,
    testnet: bool,
    concurrency: usize,
) -> Result<Snapshots> {
    debug!("Fetching snapshots for coin types {:?}", coin_types);

    stream::iter(coin_types.iter().copied())
        .map(|coin_type| async move {
            let snapshot = oracle.current_snapshot(coin_type, testnet).await?;
            Ok::<_, Error>((coin_type, snapshot))
        })
        .buffer_unordered(concurrency.max(1))
        .try_collect()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{BooleanOperation, DecimalOperation};
    use crate::functions::BooleanFunction;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use voty_common::coin_types;

    struct HoldsToken;

    #[async_trait]
    impl BooleanFunction for HoldsToken {
        fn name(&self) -> &'static str {
            "holds_token"
        }

        fn validate_arguments(&self, _arguments: &[Value]) -> Result<()> {
            Ok(())
        }

        fn required_coin_types(&self, arguments: &[Value]) -> Result<BTreeSet<CoinType>> {
            let coin_type = arguments[0].as_u64().unwrap() as CoinType;
            Ok([coin_type].into_iter().collect())
        }

        async fn check(&self, _arguments: &[Value], _did: &str, _snapshots: &Snapshots) -> Result<bool> {
            Ok(true)
        }
    }

    #[derive(Default)]
    struct CountingOracle {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl SnapshotOracle for CountingOracle {
        async fn current_snapshot(&self, coin_type: CoinType, _testnet: bool) -> Result<String> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            if coin_type == 0 {
                return Err(Error::oracle("chain 0 is down"));
            }
            Ok(format!("{}", coin_type * 10))
        }

        async fn snapshot_timestamp(
            &self,
            _coin_type: CoinType,
            _snapshot: &str,
            _testnet: bool,
        ) -> Result<DateTime<Utc>> {
            Ok(Utc::now())
        }
    }

    #[test]
    fn test_builtins_require_nothing() {
        let registry = FunctionRegistry::with_builtins();
        let expr = DecimalSets::operation(
            DecimalOperation::Sum,
            vec![DecimalSets::function(
                "prefixes_dot_suffix_fixed_power",
                vec![json!("bit"), json!([]), json!("1")],
            )],
        );
        assert!(required_coin_types_of_decimal_sets(&expr, &registry)
            .unwrap()
            .is_empty());
        assert!(required_coin_types_of_number_sets(&expr, &registry)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_union_of_leaves() {
        let mut registry = FunctionRegistry::with_builtins();
        registry.register_boolean(Arc::new(HoldsToken));
        let expr = BooleanSets::operation(
            BooleanOperation::Or,
            vec![
                BooleanSets::function("holds_token", vec![json!(60)]),
                BooleanSets::operation(
                    BooleanOperation::Not,
                    vec![BooleanSets::function("holds_token", vec![json!(309)])],
                ),
                BooleanSets::function("holds_token", vec![json!(60)]),
            ],
        );
        let coin_types = required_coin_types_of_boolean_sets(&expr, &registry).unwrap();
        assert_eq!(coin_types.into_iter().collect::<Vec<_>>(), vec![60, 309]);

        let unknown = BooleanSets::function("nope", vec![]);
        assert!(matches!(
            required_coin_types_of_boolean_sets(&unknown, &registry),
            Err(Error::UnknownFunction(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_snapshots_is_bounded() {
        let oracle = CountingOracle::default();
        let wanted: BTreeSet<CoinType> = (1..=6).collect();
        let snapshots = fetch_snapshots(&wanted, &oracle, false, 2).await.unwrap();

        assert_eq!(snapshots.len(), 6);
        assert_eq!(snapshots.get(&coin_types::CKB), None);
        assert_eq!(snapshots.get(&3).map(String::as_str), Some("30"));
        assert!(oracle.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_fetch_snapshots_propagates_oracle_failure() {
        let oracle = CountingOracle::default();
        let wanted: BTreeSet<CoinType> = [0, 1].into_iter().collect();
        let result = fetch_snapshots(&wanted, &oracle, false, 5).await;
        assert!(matches!(result, Err(Error::OracleUnavailable(_))));
    }
}
