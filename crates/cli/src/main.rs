use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tracing::debug;

use voty_common::logging::init_logging;
use voty_common::{Configuration, Snapshots, VerifierConfig};
use voty_governance::{
    derive_phase, power_of_choice, DocumentKind, DocumentVerifier, FileBlobStore, GroupDuration,
    VerifiedDocument, VotingType,
};
use voty_policy::{
    required_coin_types_of_boolean_sets, required_coin_types_of_decimal_sets, BooleanSets,
    DecimalSets, FunctionRegistry, PolicyEvaluator,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level, overridden by RUST_LOG
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate and inspect policies
    Policy {
        #[command(subcommand)]
        command: PolicyCommands,
    },
    /// Derive the phase of a proposal
    Phase {
        /// Confirmation time of the proposal (RFC 3339); omitted means unconfirmed
        #[arg(long)]
        confirmed_at: Option<DateTime<Utc>>,
        /// Time to derive the phase at (RFC 3339), defaults to now
        #[arg(long)]
        now: Option<DateTime<Utc>>,
        /// Announcing (or pending) duration in seconds
        #[arg(long)]
        announcing: u64,
        /// Proposing duration in seconds
        #[arg(long)]
        adding_option: Option<u64>,
        /// Voting duration in seconds
        #[arg(long)]
        voting: u64,
    },
    /// Work with choice tokens
    Choice {
        #[command(subcommand)]
        command: ChoiceCommands,
    },
    /// Verify a signed document against live chain oracles
    Verify {
        /// Document kind
        #[arg(long)]
        kind: DocumentKind,
        /// Path of the JSON document
        #[arg(long)]
        document: PathBuf,
        /// Directory of the file blob store holding parent documents
        #[arg(long)]
        store: PathBuf,
        /// TOML configuration file; VOTY_* variables apply otherwise
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum PolicyCommands {
    /// Whether a DID satisfies a boolean policy
    Check {
        /// Path of the policy JSON
        #[arg(long)]
        policy: PathBuf,
        #[arg(long)]
        did: String,
        /// Snapshots JSON, e.g. '{"309":"1000"}'
        #[arg(long, default_value = "{}")]
        snapshots: String,
    },
    /// Voting power of a DID under a decimal policy
    Power {
        /// Path of the policy JSON
        #[arg(long)]
        policy: PathBuf,
        #[arg(long)]
        did: String,
        /// Snapshots JSON, e.g. '{"309":"1000"}'
        #[arg(long, default_value = "{}")]
        snapshots: String,
        /// Evaluate in floating point
        #[arg(long)]
        number: bool,
    },
    /// Coin types a policy needs snapshots for
    CoinTypes {
        /// Path of the policy JSON
        #[arg(long)]
        policy: PathBuf,
        #[arg(long, value_enum, default_value_t = PolicyKind::Boolean)]
        kind: PolicyKind,
    },
}

#[derive(Subcommand)]
enum ChoiceCommands {
    /// Split the power of a vote across its chosen options
    Power {
        #[arg(long)]
        voting_type: VotingType,
        /// Choice token, e.g. '["a","b"]'
        #[arg(long)]
        choice: String,
        #[arg(long)]
        power: Decimal,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyKind {
    Boolean,
    Decimal,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Verify {
            kind,
            document,
            store,
            config,
        } => {
            let config = match config {
                Some(path) => VerifierConfig::from_file(&path)
                    .with_context(|| format!("loading {}", path.display()))?,
                None => VerifierConfig::from_env()?,
            };
            init_logging(&config.log_level)?;
            verify(&config, kind, &document, store).await
        }
        command => {
            init_logging(&cli.log_level)?;
            run_offline(command).await
        }
    }
}

async fn run_offline(command: Commands) -> Result<()> {
    let registry = Arc::new(FunctionRegistry::with_builtins());

    match command {
        Commands::Policy { command } => match command {
            PolicyCommands::Check {
                policy,
                did,
                snapshots,
            } => {
                let expr: BooleanSets = read_json(&policy)?;
                registry.validate_boolean_sets(&expr)?;
                let evaluator =
                    PolicyEvaluator::new(registry, VerifierConfig::default().max_concurrency);
                let allowed = evaluator
                    .evaluate_boolean(&expr, &did, &parse_snapshots(&snapshots)?)
                    .await?;
                println!("{}", allowed);
            }
            PolicyCommands::Power {
                policy,
                did,
                snapshots,
                number,
            } => {
                let expr: DecimalSets = read_json(&policy)?;
                let snapshots = parse_snapshots(&snapshots)?;
                let evaluator = PolicyEvaluator::new(
                    registry.clone(),
                    VerifierConfig::default().max_concurrency,
                );
                if number {
                    registry.validate_number_sets(&expr)?;
                    println!("{}", evaluator.evaluate_number(&expr, &did, &snapshots).await?);
                } else {
                    registry.validate_decimal_sets(&expr)?;
                    println!("{}", evaluator.evaluate_decimal(&expr, &did, &snapshots).await?);
                }
            }
            PolicyCommands::CoinTypes { policy, kind } => {
                let coin_types = match kind {
                    PolicyKind::Boolean => {
                        required_coin_types_of_boolean_sets(&read_json(&policy)?, &registry)?
                    }
                    PolicyKind::Decimal => {
                        required_coin_types_of_decimal_sets(&read_json(&policy)?, &registry)?
                    }
                };
                println!("{}", serde_json::to_string(&coin_types)?);
            }
        },
        Commands::Phase {
            confirmed_at,
            now,
            announcing,
            adding_option,
            voting,
        } => {
            let duration = GroupDuration {
                announcing,
                adding_option,
                voting,
            };
            let now = now.unwrap_or_else(Utc::now);
            println!("{}", derive_phase(now, confirmed_at, &duration));
        }
        Commands::Choice { command } => match command {
            ChoiceCommands::Power {
                voting_type,
                choice,
                power,
            } => {
                let powers = power_of_choice(voting_type, &choice, power)?;
                println!("{}", serde_json::to_string_pretty(&powers)?);
            }
        },
        Commands::Verify { .. } => bail!("verify needs live oracles"),
    }

    Ok(())
}

async fn verify(
    config: &VerifierConfig,
    kind: DocumentKind,
    document: &Path,
    store: PathBuf,
) -> Result<()> {
    let bytes = std::fs::read(document)
        .with_context(|| format!("reading {}", document.display()))?;

    let verifier = DocumentVerifier::new(
        config,
        Arc::new(FunctionRegistry::with_builtins()),
        Arc::new(voty_chain::did_registry(config)?),
        Arc::new(voty_chain::snapshot_oracle(config)?),
        Arc::new(FileBlobStore::new(store)),
    );
    debug!("Verifying {} as {}", document.display(), kind);

    match verifier.verify(kind, &bytes, Utc::now()).await {
        Ok(verified) => {
            println!("{}", serde_json::to_string_pretty(&accepted(kind, &verified))?);
            Ok(())
        }
        Err(rejection) => {
            let report = json!({
                "accepted": false,
                "stage": rejection.stage,
                "code": rejection.code(),
                "reason": rejection.reason.to_string(),
                "retryable": rejection.is_transient(),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
            Err(rejection.into())
        }
    }
}

fn accepted(kind: DocumentKind, verified: &VerifiedDocument) -> Value {
    let authorship = verified.authorship();
    let mut report = json!({
        "accepted": true,
        "kind": kind,
        "author": authorship.author,
        "snapshot": authorship.snapshot,
    });
    if let VerifiedDocument::Vote(vote) = verified {
        report["power"] = json!(vote.power.normalize().to_string());
    }
    report
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

fn parse_snapshots(raw: &str) -> Result<Snapshots> {
    serde_json::from_str(raw).context("snapshots must be a JSON object of coin type to block")
}
