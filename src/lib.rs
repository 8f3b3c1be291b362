//! Voty
//!
//! Policy evaluation and document verification for snapshot-based community
//! governance. Communities describe who may propose and how much each member
//! weighs as policy trees; every proposal, option and vote is a signed
//! document verified against chain snapshots before it counts.
//!
//! This crate re-exports the workspace members under one roof.

pub use voty_chain as chain;
pub use voty_common as common;
pub use voty_crypto as crypto;
pub use voty_governance as governance;
pub use voty_identity as identity;
pub use voty_policy as policy;

pub use voty_common::{Error, Result, VerifierConfig};
pub use voty_governance::{DocumentKind, DocumentVerifier, Rejection, Stage, VerifiedDocument};
pub use voty_policy::{FunctionRegistry, PolicyEvaluator};

/// Module version information
pub mod version {
    /// The current version of the Voty library
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
}
