use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use serde_json::{json, Value};

use voty::common::{coin_types, BlobStore, Error, VerifierConfig};
use voty::crypto::{LocalSigner, Signer};
use voty::governance::{
    seal_document, tally, DocumentKind, DocumentVerifier, MemoryBlobStore, Phase, ProofVersion,
    Stage, StaticSnapshotOracle, VerifiedDocument, VotingType,
};
use voty::identity::{BitDidChecker, BitPermission, DidRegistry, MemoryBitIndex};
use voty::policy::FunctionRegistry;

const ALICE_SECRET: &str = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
const BOB_SECRET: &str = "0000000000000000000000000000000000000000000000000000000000000001";
const CAROL_SECRET: &str = "0000000000000000000000000000000000000000000000000000000000000002";

/// Proposal confirmation time. The group announces for 100s, takes options
/// for 200s and votes for 300s after it.
fn confirmed_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

fn at(secs: i64) -> DateTime<Utc> {
    confirmed_at() + Duration::seconds(secs)
}

struct Network {
    store: Arc<MemoryBlobStore>,
    alice: LocalSigner,
    bob: LocalSigner,
    carol: LocalSigner,
}

impl Network {
    fn new() -> Self {
        Self {
            store: Arc::new(MemoryBlobStore::new()),
            alice: LocalSigner::from_hex(ALICE_SECRET).unwrap(),
            bob: LocalSigner::from_hex(BOB_SECRET).unwrap(),
            carol: LocalSigner::from_hex(CAROL_SECRET).unwrap(),
        }
    }

    fn index(&self) -> MemoryBitIndex {
        MemoryBitIndex::new()
            .with_permission("alice.bit", 1, BitPermission::evm(self.alice.address()))
            .with_permission("bob.bit", 1, BitPermission::evm(self.bob.address()))
            .with_permission("carol.bit", 1, BitPermission::evm(self.carol.address()))
    }

    fn oracle() -> StaticSnapshotOracle {
        StaticSnapshotOracle::new()
            .with_timestamp(coin_types::CKB, "100", at(-60))
            .with_timestamp(coin_types::CKB, "200", confirmed_at())
            .with_timestamp(coin_types::CKB, "250", at(200))
            .with_timestamp(coin_types::CKB, "300", at(400))
    }

    fn verifier(&self) -> DocumentVerifier {
        self.verifier_with_index(self.index())
    }

    fn verifier_with_index(&self, index: MemoryBitIndex) -> DocumentVerifier {
        let dids = DidRegistry::new().with_checker(Arc::new(BitDidChecker::new(Arc::new(index))));
        DocumentVerifier::new(
            &VerifierConfig::default(),
            Arc::new(FunctionRegistry::with_builtins()),
            Arc::new(dids),
            Arc::new(Self::oracle()),
            self.store.clone(),
        )
    }

    async fn publish(&self, document: &Value) -> String {
        self.store
            .put(&serde_json::to_vec(document).unwrap())
            .await
            .unwrap()
    }

    /// Community and proposal published, returns the proposal permalink
    async fn setup(&self, voting_type: &str) -> String {
        let community = seal(&self.alice, community_document("100"));
        let community = self.publish(&community).await;

        let proposal = seal(
            &self.alice,
            json!({
                "community": community,
                "group": "council",
                "title": "Fund the documentation effort",
                "voting_type": voting_type,
                "options": ["yes", "no"],
                "snapshots": { "309": "200" },
                "authorship": authorship("alice.bit", "200"),
            }),
        );
        self.publish(&proposal).await
    }
}

fn seal(signer: &LocalSigner, document: Value) -> Value {
    seal_document(document, signer, ProofVersion::V1).unwrap()
}

fn bytes(document: &Value) -> Vec<u8> {
    serde_json::to_vec(document).unwrap()
}

fn authorship(author: &str, snapshot: &str) -> Value {
    json!({ "author": author, "coin_type": 309, "snapshot": snapshot })
}

fn community_document(snapshot: &str) -> Value {
    json!({
        "name": "Voty DAO",
        "slogan": "One snapshot, one truth",
        "groups": [{
            "id": "council",
            "name": "Council",
            "permission": {
                "proposing": {
                    "function": "prefixes_dot_suffix_exact_match",
                    "arguments": ["bit", ["alice"]]
                },
                "adding_option": {
                    "operation": "or",
                    "operands": [
                        {
                            "function": "prefixes_dot_suffix_exact_match",
                            "arguments": ["bit", ["alice"]]
                        },
                        {
                            "function": "prefixes_dot_suffix_exact_match",
                            "arguments": ["bit", ["bob"]]
                        }
                    ]
                },
                "voting": {
                    "operation": "sum",
                    "operands": [
                        {
                            "function": "prefixes_dot_suffix_fixed_power",
                            "arguments": ["bit", ["alice"], "10"]
                        },
                        {
                            "function": "prefixes_dot_suffix_fixed_power",
                            "arguments": ["bit", ["bob"], "0.5"]
                        }
                    ]
                }
            },
            "duration": { "announcing": 100, "adding_option": 200, "voting": 300 }
        }],
        "authorship": authorship("alice.bit", snapshot),
    })
}

fn vote_document(proposal: &str, author: &str, choice: &str, power: &str) -> Value {
    vote_document_at(proposal, author, choice, power, "300")
}

fn vote_document_at(
    proposal: &str,
    author: &str,
    choice: &str,
    power: &str,
    snapshot: &str,
) -> Value {
    json!({
        "proposal": proposal,
        "choice": choice,
        "power": power,
        "authorship": authorship(author, snapshot),
    })
}

#[tokio::test]
async fn test_vote_accepted_during_voting() {
    let network = Network::new();
    let proposal = network.setup("single").await;
    let vote = seal(
        &network.alice,
        vote_document(&proposal, "alice.bit", "\"yes\"", "10"),
    );

    let verified = network
        .verifier()
        .verify(DocumentKind::Vote, &bytes(&vote), at(450))
        .await
        .unwrap();

    match verified {
        VerifiedDocument::Vote(vote) => {
            assert_eq!(vote.author(), "alice.bit");
            assert_eq!(vote.power, Decimal::from(10));
        }
        other => panic!("expected a vote, got {:?}", other),
    }
}

#[tokio::test]
async fn test_vote_rejected_during_proposing() {
    let network = Network::new();
    let proposal = network.setup("single").await;
    // Snapshot 200 is taken at confirmation, well before now
    let vote = seal(
        &network.alice,
        vote_document_at(&proposal, "alice.bit", "\"yes\"", "10", "200"),
    );

    let rejection = network
        .verifier()
        .verify(DocumentKind::Vote, &bytes(&vote), at(150))
        .await
        .unwrap_err();
    assert_eq!(rejection.stage, Stage::PhaseValid);
    assert!(matches!(rejection.reason, Error::PhaseViolation(_)));
    assert_eq!(rejection.code(), "PHASE_VIOLATION");
}

#[tokio::test]
async fn test_vote_with_snapshot_ahead_of_now_is_fresh() {
    let network = Network::new();
    let proposal = network.setup("single").await;
    // Snapshot 300 is timestamped at(400), 50s after now
    let vote = seal(
        &network.alice,
        vote_document(&proposal, "alice.bit", "\"no\"", "10"),
    );

    let verified = network
        .verifier()
        .verify(DocumentKind::Vote, &bytes(&vote), at(350))
        .await
        .unwrap();
    assert_eq!(verified.authorship().snapshot, "300");
}

#[tokio::test]
async fn test_altered_choice_breaks_proof() {
    let network = Network::new();
    let proposal = network.setup("single").await;
    let mut vote = seal(
        &network.alice,
        vote_document(&proposal, "alice.bit", "\"yes\"", "10"),
    );
    vote["choice"] = json!("\"no\"");

    let rejection = network
        .verifier()
        .verify(DocumentKind::Vote, &bytes(&vote), at(450))
        .await
        .unwrap_err();
    assert_eq!(rejection.stage, Stage::ProofValid);
    assert!(matches!(rejection.reason, Error::InvalidProof(_)));
}

#[tokio::test]
async fn test_claimed_power_must_match() {
    let network = Network::new();
    let proposal = network.setup("single").await;
    let vote = seal(
        &network.alice,
        vote_document(&proposal, "alice.bit", "\"yes\"", "11"),
    );

    let rejection = network
        .verifier()
        .verify_vote(vote, at(450))
        .await
        .unwrap_err();
    assert_eq!(rejection.stage, Stage::PermissionChecked);
    assert_eq!(
        rejection.reason,
        Error::PowerMismatch {
            claimed: "11".to_string(),
            computed: "10".to_string(),
        }
    );
}

#[tokio::test]
async fn test_voter_without_power_is_denied() {
    let network = Network::new();
    let proposal = network.setup("single").await;
    let vote = seal(
        &network.carol,
        vote_document(&proposal, "carol.bit", "\"yes\"", "0"),
    );

    let rejection = network
        .verifier()
        .verify_vote(vote, at(450))
        .await
        .unwrap_err();
    assert_eq!(rejection.stage, Stage::PermissionChecked);
    assert!(matches!(rejection.reason, Error::PermissionDenied(_)));
}

#[tokio::test]
async fn test_vote_for_unknown_option_fails_schema() {
    let network = Network::new();
    let proposal = network.setup("single").await;
    let vote = seal(
        &network.alice,
        vote_document(&proposal, "alice.bit", "\"maybe\"", "10"),
    );

    let rejection = network
        .verifier()
        .verify_vote(vote, at(450))
        .await
        .unwrap_err();
    assert_eq!(rejection.stage, Stage::PermissionChecked);
    assert!(matches!(rejection.reason, Error::Schema(_)));
}

#[tokio::test]
async fn test_signer_must_control_the_did() {
    let network = Network::new();
    let proposal = network.setup("single").await;
    let vote = seal(
        &network.bob,
        vote_document(&proposal, "alice.bit", "\"yes\"", "10"),
    );

    let rejection = network
        .verifier()
        .verify_vote(vote, at(450))
        .await
        .unwrap_err();
    assert_eq!(rejection.stage, Stage::AuthorshipBound);
    assert!(matches!(rejection.reason, Error::InvalidAuthorship(_)));
}

#[tokio::test]
async fn test_unavailable_index_is_transient() {
    let network = Network::new();
    let proposal = network.setup("single").await;
    let vote = seal(
        &network.alice,
        vote_document(&proposal, "alice.bit", "\"yes\"", "10"),
    );

    let rejection = network
        .verifier_with_index(MemoryBitIndex::unavailable())
        .verify_vote(vote, at(450))
        .await
        .unwrap_err();
    assert_eq!(rejection.stage, Stage::AuthorshipBound);
    assert!(rejection.is_transient());
}

#[tokio::test]
async fn test_community_and_proposal_flow() {
    let network = Network::new();
    let verifier = network.verifier();

    let community = seal(&network.alice, community_document("100"));
    let verified = verifier
        .verify(DocumentKind::Community, &bytes(&community), confirmed_at())
        .await
        .unwrap();
    assert_eq!(verified.authorship().author, "alice.bit");
    let community = network.publish(&community).await;

    let proposal = json!({
        "community": community,
        "group": "council",
        "title": "Rename the council",
        "voting_type": "approval",
        "authorship": authorship("alice.bit", "200"),
    });
    verifier
        .verify_proposal(seal(&network.alice, proposal.clone()), confirmed_at())
        .await
        .unwrap();

    let mut by_bob = proposal;
    by_bob["authorship"] = authorship("bob.bit", "200");
    let rejection = verifier
        .verify_proposal(seal(&network.bob, by_bob), confirmed_at())
        .await
        .unwrap_err();
    assert_eq!(rejection.stage, Stage::PermissionChecked);
    assert!(matches!(rejection.reason, Error::PermissionDenied(_)));
}

#[tokio::test]
async fn test_options_and_approval_tally() {
    let network = Network::new();
    let verifier = network.verifier();
    let proposal = network.setup("approval").await;

    let option = seal(
        &network.bob,
        json!({
            "proposal": proposal,
            "title": "Yes, but only for the API reference",
            "authorship": authorship("bob.bit", "250"),
        }),
    );
    let early = verifier
        .verify_option(option.clone(), at(50))
        .await
        .unwrap_err();
    assert_eq!(early.stage, Stage::PhaseValid);
    verifier.verify_option(option.clone(), at(250)).await.unwrap();
    let option = network.publish(&option).await;

    assert_eq!(
        verifier.phase_of_proposal(&proposal, at(250)).await,
        Ok(Phase::Proposing)
    );
    assert_eq!(
        verifier.voting_power(&proposal, "bob.bit").await,
        Ok(Decimal::new(5, 1))
    );

    let alice_choice = serde_json::to_string(&["yes", option.as_str()]).unwrap();
    let alice = verifier
        .verify_vote(
            seal(
                &network.alice,
                vote_document(&proposal, "alice.bit", &alice_choice, "10"),
            ),
            at(450),
        )
        .await
        .unwrap();
    let bob = verifier
        .verify_vote(
            seal(
                &network.bob,
                vote_document(&proposal, "bob.bit", "[\"yes\"]", "0.5"),
            ),
            at(450),
        )
        .await
        .unwrap();

    let result = tally(VotingType::Approval, &[alice, bob]).unwrap();
    assert_eq!(result.voters, 2);
    assert_eq!(result.total_power, Decimal::new(105, 1));
    assert_eq!(result.powers.get("yes"), Some(&Decimal::new(55, 1)));
    assert_eq!(result.powers.get(option.as_str()), Some(&Decimal::from(5)));
}
