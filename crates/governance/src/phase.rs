//! Lifecycle phases of a proposal
//!
//! Phases are consecutive half-open segments starting at the proposal's
//! confirmation time:
//!
//! ```text
//! with adding_option:    Announcing | Proposing | Voting | Ended
//! without adding_option: Pending    | Voting    | Ended
//! ```
//!
//! Before confirmation, or while it is unknown, the proposal is
//! `Confirming`.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::schema::GroupDuration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Confirming,
    Announcing,
    Pending,
    Proposing,
    Voting,
    Ended,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Confirming => "confirming",
            Phase::Announcing => "announcing",
            Phase::Pending => "pending",
            Phase::Proposing => "proposing",
            Phase::Voting => "voting",
            Phase::Ended => "ended",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn seconds(secs: u64) -> Duration {
    let secs = i64::try_from(secs).unwrap_or(i64::MAX).min(i64::MAX / 1000);
    Duration::seconds(secs)
}

/// Phase at `now` for a proposal confirmed at `confirmed_at`
pub fn derive_phase(
    now: DateTime<Utc>,
    confirmed_at: Option<DateTime<Utc>>,
    duration: &GroupDuration,
) -> Phase {
    let Some(confirmed_at) = confirmed_at else {
        return Phase::Confirming;
    };
    if now < confirmed_at {
        return Phase::Confirming;
    }

    let elapsed = now - confirmed_at;
    let segments = match duration.adding_option {
        Some(adding_option) => vec![
            (Phase::Announcing, duration.announcing),
            (Phase::Proposing, adding_option),
            (Phase::Voting, duration.voting),
        ],
        None => vec![
            (Phase::Pending, duration.announcing),
            (Phase::Voting, duration.voting),
        ],
    };

    let mut boundary = Duration::zero();
    for (phase, length) in segments {
        boundary = boundary.checked_add(&seconds(length)).unwrap_or(Duration::MAX);
        if elapsed < boundary {
            return phase;
        }
    }
    Phase::Ended
}
