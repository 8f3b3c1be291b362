//! Suffix -> checker dispatch

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use voty_common::types::did_suffix;
use voty_common::{Authorship, CoinType, Error, Proof, Result};

use crate::checker::DidChecker;

/// Registry of DID checkers keyed by suffix
#[derive(Clone, Default)]
pub struct DidRegistry {
    checkers: HashMap<String, Arc<dyn DidChecker>>,
}

impl DidRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a checker, replacing any checker for the same suffix
    pub fn register(&mut self, checker: Arc<dyn DidChecker>) {
        debug!("Registering DID checker for .{}", checker.suffix());
        self.checkers.insert(checker.suffix().to_string(), checker);
    }

    /// Builder form of [`DidRegistry::register`]
    pub fn with_checker(mut self, checker: Arc<dyn DidChecker>) -> Self {
        self.register(checker);
        self
    }

    /// Sorted suffixes with a registered checker
    pub fn suffixes(&self) -> Vec<&str> {
        let mut suffixes: Vec<&str> = self.checkers.keys().map(String::as_str).collect();
        suffixes.sort_unstable();
        suffixes
    }

    /// Checker responsible for `did`
    pub fn checker(&self, did: &str) -> Result<&Arc<dyn DidChecker>> {
        did_suffix(did)
            .and_then(|suffix| self.checkers.get(suffix))
            .ok_or_else(|| Error::UnsupportedDid(did.to_string()))
    }

    /// Coin type the authorship snapshot of `did` must refer to
    pub fn required_coin_type_of_did_checker(&self, did: &str) -> Result<CoinType> {
        Ok(self.checker(did)?.required_coin_type())
    }

    /// Whether `proof.address` controls `did` at `snapshot` on `coin_type`
    pub async fn check(
        &self,
        did: &str,
        coin_type: CoinType,
        snapshot: &str,
        testnet: bool,
        proof: &Proof,
    ) -> Result<bool> {
        let checker = self.checker(did)?;
        if checker.required_coin_type() != coin_type {
            return Err(Error::CoinTypeMismatch {
                expected: checker.required_coin_type(),
                actual: coin_type,
            });
        }
        proof.proof_kind()?;

        checker.check(did, snapshot, testnet, proof).await
    }

    /// [`DidRegistry::check`] for the claims of an authorship block
    pub async fn check_did_authorship_proof(
        &self,
        authorship: &Authorship,
        proof: &Proof,
    ) -> Result<bool> {
        self.check(
            &authorship.author,
            authorship.coin_type,
            &authorship.snapshot,
            authorship.testnet,
            proof,
        )
        .await
    }
}
