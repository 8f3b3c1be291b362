//! Documents that passed the verification pipeline

use std::ops::Deref;

use voty_common::{Authorship, Proof};

use crate::schema::{Community, Proposal, ProposalOption, Signed, Vote};

/// A document that passed every stage of the pipeline. Only
/// [`crate::DocumentVerifier`] creates these.
#[derive(Debug, Clone, PartialEq)]
pub struct Verified<T> {
    signed: Signed<T>,
}

impl<T> Verified<T> {
    pub(crate) fn new(signed: Signed<T>) -> Self {
        Self { signed }
    }

    pub fn document(&self) -> &T {
        &self.signed.document
    }

    pub fn authorship(&self) -> &Authorship {
        &self.signed.authorship
    }

    /// DID of the author
    pub fn author(&self) -> &str {
        &self.signed.authorship.author
    }

    pub fn proof(&self) -> &Proof {
        &self.signed.proof
    }

    pub fn signed(&self) -> &Signed<T> {
        &self.signed
    }

    pub fn into_signed(self) -> Signed<T> {
        self.signed
    }
}

impl<T> Deref for Verified<T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.document()
    }
}

/// Output of [`crate::DocumentVerifier::verify`]
#[derive(Debug, Clone, PartialEq)]
pub enum VerifiedDocument {
    Community(Verified<Community>),
    Proposal(Verified<Proposal>),
    Option(Verified<ProposalOption>),
    Vote(Verified<Vote>),
}

impl VerifiedDocument {
    pub fn authorship(&self) -> &Authorship {
        match self {
            VerifiedDocument::Community(d) => d.authorship(),
            VerifiedDocument::Proposal(d) => d.authorship(),
            VerifiedDocument::Option(d) => d.authorship(),
            VerifiedDocument::Vote(d) => d.authorship(),
        }
    }
}
