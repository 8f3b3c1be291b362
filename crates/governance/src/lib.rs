//! Voty governance documents
//!
//! Communities define groups with permission policies and phase durations.
//! Proposals, options and votes are signed documents that reference their
//! parents by permalink. [`DocumentVerifier`] decides whether a submitted
//! document is acceptable at a given time.

pub mod choice;
pub mod freshness;
pub mod oracle;
pub mod permission;
pub mod phase;
pub mod pipeline;
pub mod proof;
pub mod schema;
pub mod store;
mod timeout;
pub mod verified;

pub use choice::{
    check_choice, is_choice_empty, parse_choice, power_of_choice, tally, update_choice, Tally,
};
pub use freshness::{check_freshness, SnapshotFreshnessGuard};
pub use oracle::StaticSnapshotOracle;
pub use permission::{can_act, can_act_in_group, Action};
pub use phase::{derive_phase, Phase};
pub use pipeline::{DocumentKind, DocumentVerifier, Rejection, Stage};
pub use proof::{seal_document, sign_document, signing_message, ProofVerifier, ProofVersion};
pub use schema::{
    canonical_json, Community, Group, GroupDuration, GroupPermission, Proposal, ProposalOption,
    Signed, Validate, Vote, VotingType,
};
pub use store::{FileBlobStore, MemoryBlobStore};
pub use verified::{Verified, VerifiedDocument};
