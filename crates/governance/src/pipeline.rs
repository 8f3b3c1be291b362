//! Document verification pipeline
//!
//! Every document runs through the same stages in order and is rejected at
//! the first failure:
//!
//! ```text
//! SchemaValidated -> SnapshotFresh -> ProofValid -> AuthorshipBound
//!     -> PermissionChecked -> PhaseValid -> accepted
//! ```
//!
//! Community documents stop after `AuthorshipBound`. Proposals have no phase
//! gate. Parent documents are loaded from the blob store during
//! `PermissionChecked`.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error as ThisError;
use tracing::{debug, info, warn};

use voty_common::{
    Authorship, BlobStore, Error, Result, SnapshotOracle, Snapshots, VerifierConfig,
};
use voty_identity::DidRegistry;
use voty_policy::{FunctionRegistry, PolicyEvaluator};

use crate::choice::parse_choice;
use crate::freshness::SnapshotFreshnessGuard;
use crate::permission::{
    self, find_group, required_coin_types_of_group, voting_power_in_group, Action,
};
use crate::phase::{derive_phase, Phase};
use crate::proof::ProofVerifier;
use crate::schema::{Community, Group, Proposal, ProposalOption, Signed, Validate, Vote};
use crate::timeout::within;
use crate::verified::{Verified, VerifiedDocument};

/// Pipeline stage a document failed to reach
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    SchemaValidated,
    SnapshotFresh,
    ProofValid,
    AuthorshipBound,
    PermissionChecked,
    PhaseValid,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::SchemaValidated => "schema_validated",
            Stage::SnapshotFresh => "snapshot_fresh",
            Stage::ProofValid => "proof_valid",
            Stage::AuthorshipBound => "authorship_bound",
            Stage::PermissionChecked => "permission_checked",
            Stage::PhaseValid => "phase_valid",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal failure of the pipeline
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
#[error("rejected at {stage}: {reason}")]
pub struct Rejection {
    pub stage: Stage,
    pub reason: Error,
}

impl Rejection {
    /// Stable code of the underlying error
    pub fn code(&self) -> &'static str {
        self.reason.code()
    }

    /// Whether resubmitting may succeed without changing the document
    pub fn is_transient(&self) -> bool {
        self.reason.is_transient()
    }
}

trait StageExt<T> {
    fn at(self, stage: Stage) -> std::result::Result<T, Rejection>;
}

impl<T> StageExt<T> for Result<T> {
    fn at(self, stage: Stage) -> std::result::Result<T, Rejection> {
        self.map_err(|reason| {
            warn!("Document rejected at {}: {}", stage, reason);
            Rejection { stage, reason }
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Community,
    Proposal,
    Option,
    Vote,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Community => "community",
            DocumentKind::Proposal => "proposal",
            DocumentKind::Option => "option",
            DocumentKind::Vote => "vote",
        }
    }
}

impl FromStr for DocumentKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "community" => Ok(DocumentKind::Community),
            "proposal" => Ok(DocumentKind::Proposal),
            "option" => Ok(DocumentKind::Option),
            "vote" => Ok(DocumentKind::Vote),
            other => Err(Error::schema(format!("unknown document kind '{}'", other))),
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A proposal with the group it was made in
struct ProposalContext {
    proposal: Signed<Proposal>,
    group: Group,
}

/// Verifies documents against chain state, the blob store and the
/// permissions of their parents. Stateless between calls.
#[derive(Clone)]
pub struct DocumentVerifier {
    evaluator: PolicyEvaluator,
    dids: Arc<DidRegistry>,
    proofs: ProofVerifier,
    freshness: SnapshotFreshnessGuard,
    store: Arc<dyn BlobStore>,
    timeout: Duration,
}

impl DocumentVerifier {
    pub fn new(
        config: &VerifierConfig,
        functions: Arc<FunctionRegistry>,
        dids: Arc<DidRegistry>,
        oracle: Arc<dyn SnapshotOracle>,
        store: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            evaluator: PolicyEvaluator::new(functions, config.max_concurrency),
            dids,
            proofs: ProofVerifier::default(),
            freshness: SnapshotFreshnessGuard::from_config(oracle, config),
            store,
            timeout: config.oracle_timeout(),
        }
    }

    /// Replace the signature recovery backend
    pub fn with_proof_verifier(mut self, proofs: ProofVerifier) -> Self {
        self.proofs = proofs;
        self
    }

    pub fn evaluator(&self) -> &PolicyEvaluator {
        &self.evaluator
    }

    /// Verify a serialized document of `kind` as of `now`
    pub async fn verify(
        &self,
        kind: DocumentKind,
        bytes: &[u8],
        now: DateTime<Utc>,
    ) -> std::result::Result<VerifiedDocument, Rejection> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| Error::schema(format!("invalid JSON: {}", e)))
            .at(Stage::SchemaValidated)?;
        debug!("Verifying {} document", kind);

        match kind {
            DocumentKind::Community => self
                .verify_community(value, now)
                .await
                .map(VerifiedDocument::Community),
            DocumentKind::Proposal => self
                .verify_proposal(value, now)
                .await
                .map(VerifiedDocument::Proposal),
            DocumentKind::Option => self
                .verify_option(value, now)
                .await
                .map(VerifiedDocument::Option),
            DocumentKind::Vote => self.verify_vote(value, now).await.map(VerifiedDocument::Vote),
        }
    }

    pub async fn verify_community(
        &self,
        value: Value,
        now: DateTime<Utc>,
    ) -> std::result::Result<Verified<Community>, Rejection> {
        let signed = Signed::<Community>::from_value(value)
            .and_then(|signed| {
                signed
                    .document
                    .validate_policies(self.evaluator.registry())?;
                Ok(signed)
            })
            .at(Stage::SchemaValidated)?;
        debug!("Community '{}' passed schema validation", signed.document.name);

        self.verify_authorship(&signed, now).await?;

        info!(
            "Accepted community '{}' by {}",
            signed.document.name, signed.authorship.author
        );
        Ok(Verified::new(signed))
    }

    pub async fn verify_proposal(
        &self,
        value: Value,
        now: DateTime<Utc>,
    ) -> std::result::Result<Verified<Proposal>, Rejection> {
        let signed = parse::<Proposal>(value)?;
        self.verify_authorship(&signed, now).await?;

        async {
            let proposal = &signed.document;
            let community: Signed<Community> = self.load(&proposal.community).await?;
            let group = find_group(&community.document, &proposal.group)?;

            for coin_type in required_coin_types_of_group(group, self.evaluator.registry())? {
                if !proposal.snapshots.contains_key(&coin_type) {
                    return Err(Error::ChainDataUnavailable(coin_type));
                }
            }

            self.require(
                group,
                Action::Propose,
                &signed.authorship.author,
                &proposal.snapshots,
            )
            .await
        }
        .await
        .at(Stage::PermissionChecked)?;
        debug!("Proposal '{}' passed permission check", signed.document.title);

        info!(
            "Accepted proposal '{}' by {}",
            signed.document.title, signed.authorship.author
        );
        Ok(Verified::new(signed))
    }

    pub async fn verify_option(
        &self,
        value: Value,
        now: DateTime<Utc>,
    ) -> std::result::Result<Verified<ProposalOption>, Rejection> {
        let signed = parse::<ProposalOption>(value)?;
        self.verify_authorship(&signed, now).await?;

        let context = async {
            let context = self.load_proposal_context(&signed.document.proposal).await?;
            if context.group.permission.adding_option.is_none() {
                return Err(Error::permission_denied(format!(
                    "group '{}' does not accept options",
                    context.group.id
                )));
            }
            self.require(
                &context.group,
                Action::AddOption,
                &signed.authorship.author,
                &context.proposal.document.snapshots,
            )
            .await?;
            Ok::<_, Error>(context)
        }
        .await
        .at(Stage::PermissionChecked)?;
        debug!("Option '{}' passed permission check", signed.document.title);

        self.require_phase(&context, Phase::Proposing, now)
            .await
            .at(Stage::PhaseValid)?;

        info!(
            "Accepted option '{}' by {}",
            signed.document.title, signed.authorship.author
        );
        Ok(Verified::new(signed))
    }

    pub async fn verify_vote(
        &self,
        value: Value,
        now: DateTime<Utc>,
    ) -> std::result::Result<Verified<Vote>, Rejection> {
        let signed = parse::<Vote>(value)?;
        self.verify_authorship(&signed, now).await?;

        let vote = &signed.document;
        let context = async {
            let context = self.load_proposal_context(&vote.proposal).await?;
            self.check_vote_choice(vote, &context.proposal.document).await?;

            let computed = self
                .with_timeout(
                    "voting power evaluation",
                    voting_power_in_group(
                        &self.evaluator,
                        &context.group,
                        &signed.authorship.author,
                        &context.proposal.document.snapshots,
                    ),
                )
                .await?;
            if computed <= Decimal::ZERO {
                return Err(Error::permission_denied(format!(
                    "{} has no voting power in group '{}'",
                    signed.authorship.author, context.group.id
                )));
            }
            if computed != vote.power {
                return Err(Error::PowerMismatch {
                    claimed: vote.power.normalize().to_string(),
                    computed: computed.normalize().to_string(),
                });
            }
            Ok::<_, Error>(context)
        }
        .await
        .at(Stage::PermissionChecked)?;
        debug!("Vote by {} passed permission check", signed.authorship.author);

        self.require_phase(&context, Phase::Voting, now)
            .await
            .at(Stage::PhaseValid)?;

        info!(
            "Accepted vote by {} on {} with power {}",
            signed.authorship.author, vote.proposal, vote.power
        );
        Ok(Verified::new(signed))
    }

    /// Voting power `did` would have on the proposal at `proposal_permalink`
    pub async fn voting_power(&self, proposal_permalink: &str, did: &str) -> Result<Decimal> {
        let context = self.load_proposal_context(proposal_permalink).await?;
        self.with_timeout(
            "voting power evaluation",
            voting_power_in_group(
                &self.evaluator,
                &context.group,
                did,
                &context.proposal.document.snapshots,
            ),
        )
        .await
    }

    /// Whether `did` may perform `action` in a group of the community at
    /// `community_permalink`
    pub async fn can_act(
        &self,
        community_permalink: &str,
        group_id: &str,
        action: Action,
        did: &str,
        snapshots: &Snapshots,
    ) -> Result<bool> {
        let community: Signed<Community> = self.load(community_permalink).await?;
        self.with_timeout(
            "permission evaluation",
            permission::can_act(
                &self.evaluator,
                &community.document,
                group_id,
                action,
                did,
                snapshots,
            ),
        )
        .await
    }

    /// Current phase of the proposal at `proposal_permalink`
    pub async fn phase_of_proposal(
        &self,
        proposal_permalink: &str,
        now: DateTime<Utc>,
    ) -> Result<Phase> {
        let context = self.load_proposal_context(proposal_permalink).await?;
        self.phase_of(&context, now).await
    }

    async fn verify_authorship<T>(
        &self,
        signed: &Signed<T>,
        now: DateTime<Utc>,
    ) -> std::result::Result<(), Rejection> {
        let authorship = &signed.authorship;

        self.freshness
            .verify_snapshot_freshness(authorship, now)
            .await
            .at(Stage::SnapshotFresh)?;
        debug!("Snapshot {} is fresh", authorship.snapshot);

        self.proofs
            .verify_signed(signed)
            .and_then(|valid| {
                if valid {
                    Ok(())
                } else {
                    Err(Error::invalid_proof(format!(
                        "signature does not recover to {}",
                        signed.proof.address
                    )))
                }
            })
            .at(Stage::ProofValid)?;
        debug!("Proof by {} is valid", signed.proof.address);

        self.with_timeout(
            "authorship check",
            self.dids.check_did_authorship_proof(authorship, &signed.proof),
        )
        .await
        .and_then(|bound| {
            if bound {
                Ok(())
            } else {
                Err(Error::invalid_authorship(format!(
                    "{} does not control {} at snapshot {}",
                    signed.proof.address, authorship.author, authorship.snapshot
                )))
            }
        })
        .at(Stage::AuthorshipBound)?;
        debug!("{} is bound to {}", authorship.author, signed.proof.address);

        Ok(())
    }

    async fn require(
        &self,
        group: &Group,
        action: Action,
        did: &str,
        snapshots: &Snapshots,
    ) -> Result<()> {
        let allowed = self
            .with_timeout(
                "permission evaluation",
                permission::can_act_in_group(&self.evaluator, group, action, did, snapshots),
            )
            .await?;
        if !allowed {
            return Err(Error::permission_denied(format!(
                "{} may not {} in group '{}'",
                did, action, group.id
            )));
        }
        Ok(())
    }

    /// Every chosen option must be a proposal option or the permalink of an
    /// option document made for this proposal
    async fn check_vote_choice(&self, vote: &Vote, proposal: &Proposal) -> Result<()> {
        let chosen = parse_choice(proposal.voting_type, &vote.choice)?;
        if chosen.is_empty() {
            return Err(Error::schema("choice must not be empty"));
        }

        for option in &chosen {
            if proposal.options.contains(option) {
                continue;
            }
            let belongs = match self.fetch(option).await? {
                Some(bytes) => Signed::<ProposalOption>::from_slice(&bytes)
                    .map(|added| added.document.proposal == vote.proposal)
                    .unwrap_or(false),
                None => false,
            };
            if !belongs {
                return Err(Error::schema(format!(
                    "'{}' is not an option of {}",
                    option, vote.proposal
                )));
            }
        }
        Ok(())
    }

    async fn require_phase(
        &self,
        context: &ProposalContext,
        expected: Phase,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let phase = self.phase_of(context, now).await?;
        if phase != expected {
            return Err(Error::phase_violation(format!(
                "proposal is {}, expected {}",
                phase, expected
            )));
        }
        debug!("Proposal is {}", phase);
        Ok(())
    }

    async fn phase_of(&self, context: &ProposalContext, now: DateTime<Utc>) -> Result<Phase> {
        let confirmed_at = self.confirmed_at(&context.proposal.authorship).await?;
        Ok(derive_phase(now, confirmed_at, &context.group.duration))
    }

    /// Time the proposal's snapshot was produced, `None` while the chain has
    /// not reached it
    async fn confirmed_at(&self, authorship: &Authorship) -> Result<Option<DateTime<Utc>>> {
        match self.freshness.snapshot_time(authorship).await {
            Ok(time) => Ok(Some(time)),
            Err(Error::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn load_proposal_context(&self, permalink: &str) -> Result<ProposalContext> {
        let proposal: Signed<Proposal> = self.load(permalink).await?;
        let community: Signed<Community> = self.load(&proposal.document.community).await?;
        let group = find_group(&community.document, &proposal.document.group)?.clone();
        Ok(ProposalContext { proposal, group })
    }

    async fn fetch(&self, permalink: &str) -> Result<Option<Vec<u8>>> {
        within(
            self.timeout,
            "blob fetch",
            Error::Storage,
            self.store.get(permalink),
        )
        .await
    }

    async fn load<T: DeserializeOwned + Validate>(&self, permalink: &str) -> Result<Signed<T>> {
        let bytes = self
            .fetch(permalink)
            .await?
            .ok_or_else(|| Error::not_found(format!("document {}", permalink)))?;
        Signed::from_slice(&bytes)
    }

    async fn with_timeout<T, F>(&self, what: &str, future: F) -> Result<T>
    where
        F: std::future::Future<Output = Result<T>>,
    {
        within(self.timeout, what, Error::OracleUnavailable, future).await
    }
}

fn parse<T: DeserializeOwned + Validate>(
    value: Value,
) -> std::result::Result<Signed<T>, Rejection> {
    let signed = Signed::<T>::from_value(value).at(Stage::SchemaValidated)?;
    debug!("Document by {} passed schema validation", signed.authorship.author);
    Ok(signed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::StaticSnapshotOracle;
    use crate::proof::{seal_document, ProofVersion};
    use crate::store::MemoryBlobStore;
    use chrono::TimeZone;
    use serde_json::json;
    use voty_common::coin_types;
    use voty_crypto::{LocalSigner, Signer};
    use voty_identity::{BitDidChecker, BitPermission, MemoryBitIndex};

    const ALICE_SECRET: &str = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    struct Fixture {
        verifier: DocumentVerifier,
        store: Arc<MemoryBlobStore>,
        signer: LocalSigner,
        now: DateTime<Utc>,
    }

    fn fixture() -> Fixture {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let signer = LocalSigner::from_hex(ALICE_SECRET).unwrap();

        let index = MemoryBitIndex::new()
            .with_permission("alice.bit", 1, BitPermission::evm(signer.address()));
        let dids = DidRegistry::new().with_checker(Arc::new(BitDidChecker::new(Arc::new(index))));
        let oracle = StaticSnapshotOracle::new()
            .with_timestamp(coin_types::CKB, "100", now - chrono::Duration::minutes(5))
            .with_timestamp(coin_types::CKB, "1", now - chrono::Duration::days(1));
        let store = Arc::new(MemoryBlobStore::new());

        let verifier = DocumentVerifier::new(
            &VerifierConfig::default(),
            Arc::new(FunctionRegistry::with_builtins()),
            Arc::new(dids),
            Arc::new(oracle),
            store.clone(),
        );

        Fixture {
            verifier,
            store,
            signer,
            now,
        }
    }

    fn authorship(snapshot: &str) -> Value {
        json!({ "author": "alice.bit", "coin_type": 309, "snapshot": snapshot })
    }

    fn community() -> Value {
        json!({
            "name": "Voty DAO",
            "groups": [{
                "id": "council",
                "name": "Council",
                "permission": {
                    "proposing": {
                        "function": "prefixes_dot_suffix_exact_match",
                        "arguments": ["bit", ["alice"]]
                    },
                    "voting": {
                        "function": "prefixes_dot_suffix_fixed_power",
                        "arguments": ["bit", [], "1"]
                    }
                },
                "duration": { "announcing": 100, "voting": 300 }
            }],
            "authorship": authorship("100")
        })
    }

    impl Fixture {
        fn seal(&self, document: Value) -> Value {
            seal_document(document, &self.signer, ProofVersion::V1).unwrap()
        }

        async fn publish(&self, document: Value) -> String {
            let sealed = self.seal(document);
            self.store
                .put(&serde_json::to_vec(&sealed).unwrap())
                .await
                .unwrap()
        }
    }

    #[tokio::test]
    async fn test_accepts_community() {
        let f = fixture();
        let bytes = serde_json::to_vec(&f.seal(community())).unwrap();
        let verified = f
            .verifier
            .verify(DocumentKind::Community, &bytes, f.now)
            .await
            .unwrap();

        match verified {
            VerifiedDocument::Community(community) => {
                assert_eq!(community.name, "Voty DAO");
                assert_eq!(community.author(), "alice.bit");
            }
            other => panic!("unexpected document {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_community_with_unknown_function_fails_schema() {
        let f = fixture();
        let mut document = community();
        document["groups"][0]["permission"]["proposing"]["function"] = json!("holds_nft");

        let rejection = f
            .verifier
            .verify_community(f.seal(document), f.now)
            .await
            .unwrap_err();
        assert_eq!(rejection.stage, Stage::SchemaValidated);
        assert_eq!(rejection.reason, Error::UnknownFunction("holds_nft".to_string()));
    }

    #[tokio::test]
    async fn test_stage_order() {
        let f = fixture();

        let mut stale = community();
        stale["authorship"] = authorship("1");
        let rejection = f.verifier.verify_community(f.seal(stale), f.now).await.unwrap_err();
        assert_eq!(rejection.stage, Stage::SnapshotFresh);
        assert!(matches!(rejection.reason, Error::StaleSnapshot(_)));

        let mut tampered = f.seal(community());
        tampered["name"] = json!("Other DAO");
        let rejection = f.verifier.verify_community(tampered, f.now).await.unwrap_err();
        assert_eq!(rejection.stage, Stage::ProofValid);
        assert_eq!(rejection.code(), "INVALID_PROOF");

        let mut bob = community();
        bob["authorship"]["author"] = json!("bob.bit");
        let rejection = f.verifier.verify_community(f.seal(bob), f.now).await.unwrap_err();
        assert_eq!(rejection.stage, Stage::AuthorshipBound);
        assert!(matches!(rejection.reason, Error::InvalidAuthorship(_)));
        assert!(!rejection.is_transient());
    }

    #[tokio::test]
    async fn test_proposal_permission() {
        let f = fixture();
        let community = f.publish(community()).await;

        let proposal = json!({
            "community": community,
            "group": "council",
            "title": "Fund the docs",
            "voting_type": "single",
            "options": ["yes", "no"],
            "authorship": authorship("100")
        });
        let verified = f
            .verifier
            .verify_proposal(f.seal(proposal.clone()), f.now)
            .await
            .unwrap();
        assert_eq!(verified.options, vec!["yes", "no"]);

        let mut elsewhere = proposal.clone();
        elsewhere["group"] = json!("treasury");
        let rejection = f
            .verifier
            .verify_proposal(f.seal(elsewhere), f.now)
            .await
            .unwrap_err();
        assert_eq!(rejection.stage, Stage::PermissionChecked);
        assert!(matches!(rejection.reason, Error::Schema(_)));

        let mut orphan = proposal;
        orphan["community"] = json!("memory://missing");
        let rejection = f
            .verifier
            .verify_proposal(f.seal(orphan), f.now)
            .await
            .unwrap_err();
        assert!(matches!(rejection.reason, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_option_needs_adding_option_permission() {
        let f = fixture();
        let community = f.publish(community()).await;
        let proposal = f
            .publish(json!({
                "community": community,
                "group": "council",
                "title": "Fund the docs",
                "voting_type": "single",
                "authorship": authorship("100")
            }))
            .await;

        let option = json!({
            "proposal": proposal,
            "title": "Half now, half later",
            "authorship": authorship("100")
        });
        let rejection = f
            .verifier
            .verify_option(f.seal(option), f.now)
            .await
            .unwrap_err();
        assert_eq!(rejection.stage, Stage::PermissionChecked);
        assert!(matches!(rejection.reason, Error::PermissionDenied(_)));
    }

    #[tokio::test]
    async fn test_read_paths() {
        let f = fixture();
        let community = f.publish(community()).await;
        let proposal = f
            .publish(json!({
                "community": community,
                "group": "council",
                "title": "Fund the docs",
                "voting_type": "single",
                "options": ["yes", "no"],
                "authorship": authorship("100")
            }))
            .await;

        assert_eq!(
            f.verifier.voting_power(&proposal, "carol.bit").await,
            Ok(Decimal::ONE)
        );
        assert_eq!(
            f.verifier
                .can_act(&community, "council", Action::Propose, "carol.bit", &Snapshots::new())
                .await,
            Ok(false)
        );

        // Confirmed five minutes ago: announcing is 100s, voting 300s
        assert_eq!(
            f.verifier.phase_of_proposal(&proposal, f.now).await,
            Ok(Phase::Voting)
        );
        assert_eq!(
            f.verifier
                .phase_of_proposal(&proposal, f.now + chrono::Duration::minutes(10))
                .await,
            Ok(Phase::Ended)
        );
    }

    #[test]
    fn test_rejection_display() {
        let rejection = Rejection {
            stage: Stage::PhaseValid,
            reason: Error::phase_violation("proposal is proposing, expected voting"),
        };
        assert_eq!(
            rejection.to_string(),
            "rejected at phase_valid: Phase violation: proposal is proposing, expected voting"
        );
        assert_eq!("vote".parse::<DocumentKind>().unwrap(), DocumentKind::Vote);
        assert!("ballot".parse::<DocumentKind>().is_err());
    }
}
