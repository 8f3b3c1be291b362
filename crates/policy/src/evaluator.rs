//! Recursive policy evaluation
//!
//! Sibling operands are evaluated concurrently. Only leaf evaluations take a
//! permit from the shared semaphore, so the fan-out towards chain oracles is
//! bounded while combinators never wait on each other.

use std::collections::BTreeSet;
use std::sync::Arc;

use futures::future::{try_join_all, BoxFuture, FutureExt};
use rust_decimal::Decimal;
use tokio::sync::{Semaphore, SemaphorePermit};
use tracing::debug;

use voty_common::{CoinType, Error, Result, Snapshots};

use crate::expr::{
    BooleanOperation, BooleanSets, DecimalOperation, DecimalSets, PolicyExpr, MAX_POLICY_DEPTH,
};
use crate::registry::FunctionRegistry;

/// Evaluates boolean and decimal policy trees for a DID
#[derive(Clone)]
pub struct PolicyEvaluator {
    registry: Arc<FunctionRegistry>,
    permits: Arc<Semaphore>,
}

impl PolicyEvaluator {
    /// Create an evaluator allowing at most `max_concurrency` leaf
    /// evaluations in flight
    pub fn new(registry: Arc<FunctionRegistry>, max_concurrency: usize) -> Self {
        Self {
            registry,
            permits: Arc::new(Semaphore::new(max_concurrency.max(1))),
        }
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    /// Whether `did` belongs to the set described by `expr`
    pub async fn evaluate_boolean(
        &self,
        expr: &BooleanSets,
        did: &str,
        snapshots: &Snapshots,
    ) -> Result<bool> {
        self.boolean_at(expr, did, snapshots, 1).await
    }

    /// Voting power of `did` under `expr`, in arbitrary precision
    pub async fn evaluate_decimal(
        &self,
        expr: &DecimalSets,
        did: &str,
        snapshots: &Snapshots,
    ) -> Result<Decimal> {
        self.decimal_at(expr, did, snapshots, 1).await
    }

    /// Voting power of `did` under `expr`, in floating point
    pub async fn evaluate_number(
        &self,
        expr: &DecimalSets,
        did: &str,
        snapshots: &Snapshots,
    ) -> Result<f64> {
        self.number_at(expr, did, snapshots, 1).await
    }

    fn boolean_at<'a>(
        &'a self,
        expr: &'a BooleanSets,
        did: &'a str,
        snapshots: &'a Snapshots,
        depth: usize,
    ) -> BoxFuture<'a, Result<bool>> {
        async move {
            check_node(expr, depth)?;
            match expr {
                PolicyExpr::Operation { operation, operands } => {
                    let values = try_join_all(
                        operands
                            .iter()
                            .map(|operand| self.boolean_at(operand, did, snapshots, depth + 1)),
                    )
                    .await?;

                    Ok(match operation {
                        BooleanOperation::Or => values.iter().any(|value| *value),
                        BooleanOperation::And => values.iter().all(|value| *value),
                        // exactly one operand
                        BooleanOperation::Not => !values.iter().any(|value| *value),
                    })
                }
                PolicyExpr::Function { function, arguments } => {
                    let f = self.registry.boolean(function)?;
                    ensure_snapshots(f.required_coin_types(arguments)?, snapshots)?;

                    let _permit = self.acquire().await?;
                    let value = f.check(arguments, did, snapshots).await?;
                    debug!("{}({}) = {}", function, did, value);
                    Ok(value)
                }
            }
        }
        .boxed()
    }

    fn decimal_at<'a>(
        &'a self,
        expr: &'a DecimalSets,
        did: &'a str,
        snapshots: &'a Snapshots,
        depth: usize,
    ) -> BoxFuture<'a, Result<Decimal>> {
        async move {
            check_node(expr, depth)?;
            match expr {
                PolicyExpr::Operation { operation, operands } => {
                    let values = try_join_all(
                        operands
                            .iter()
                            .map(|operand| self.decimal_at(operand, did, snapshots, depth + 1)),
                    )
                    .await?;

                    match operation {
                        DecimalOperation::Max => values
                            .into_iter()
                            .max()
                            .ok_or_else(|| Error::arity("'max' requires at least one operand")),
                        DecimalOperation::Sum => {
                            values.into_iter().try_fold(Decimal::ZERO, |total, value| {
                                total
                                    .checked_add(value)
                                    .ok_or_else(|| Error::schema("voting power overflows"))
                            })
                        }
                    }
                }
                PolicyExpr::Function { function, arguments } => {
                    let f = self.registry.decimal(function)?;
                    ensure_snapshots(f.required_coin_types(arguments)?, snapshots)?;

                    let _permit = self.acquire().await?;
                    let value = f.calculate(arguments, did, snapshots).await?;
                    debug!("{}({}) = {}", function, did, value);
                    Ok(value)
                }
            }
        }
        .boxed()
    }

    fn number_at<'a>(
        &'a self,
        expr: &'a DecimalSets,
        did: &'a str,
        snapshots: &'a Snapshots,
        depth: usize,
    ) -> BoxFuture<'a, Result<f64>> {
        async move {
            check_node(expr, depth)?;
            match expr {
                PolicyExpr::Operation { operation, operands } => {
                    let values = try_join_all(
                        operands
                            .iter()
                            .map(|operand| self.number_at(operand, did, snapshots, depth + 1)),
                    )
                    .await?;

                    Ok(match operation {
                        DecimalOperation::Max => {
                            values.into_iter().fold(f64::NEG_INFINITY, f64::max)
                        }
                        DecimalOperation::Sum => values.into_iter().sum(),
                    })
                }
                PolicyExpr::Function { function, arguments } => {
                    let f = self.registry.number(function)?;
                    ensure_snapshots(f.required_coin_types(arguments)?, snapshots)?;

                    let _permit = self.acquire().await?;
                    let value = f.calculate(arguments, did, snapshots).await?;
                    debug!("{}({}) = {}", function, did, value);
                    Ok(value)
                }
            }
        }
        .boxed()
    }

    async fn acquire(&self) -> Result<SemaphorePermit<'_>> {
        self.permits
            .acquire()
            .await
            .map_err(|_| Error::configuration("policy evaluator semaphore closed"))
    }
}

fn check_node<O: crate::expr::Operator>(expr: &PolicyExpr<O>, depth: usize) -> Result<()> {
    if depth > MAX_POLICY_DEPTH {
        return Err(Error::schema(format!(
            "policy nested deeper than {} levels",
            MAX_POLICY_DEPTH
        )));
    }
    expr.check_arity()
}

fn ensure_snapshots(required: BTreeSet<CoinType>, snapshots: &Snapshots) -> Result<()> {
    match required
        .into_iter()
        .find(|coin_type| !snapshots.contains_key(coin_type))
    {
        Some(missing) => Err(Error::ChainDataUnavailable(missing)),
        None => Ok(()),
    }
}
