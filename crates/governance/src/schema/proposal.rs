//! Proposal documents

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use voty_common::{Error, Result, Snapshots};

use super::{require_text, Validate};

/// How a voter's choice is encoded and weighted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VotingType {
    /// One option receives the full power
    Single,
    /// Any number of options share the power
    #[serde(alias = "multiple")]
    Approval,
}

impl VotingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VotingType::Single => "single",
            VotingType::Approval => "approval",
        }
    }
}

impl FromStr for VotingType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "single" => Ok(VotingType::Single),
            "approval" | "multiple" => Ok(VotingType::Approval),
            other => Err(Error::schema(format!("unknown voting type '{}'", other))),
        }
    }
}

impl fmt::Display for VotingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A proposal made in a community group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    /// Permalink of the community document
    pub community: String,
    /// Id of the group within that community
    pub group: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub voting_type: VotingType,
    /// Options fixed at proposing time; more may be added as option documents
    #[serde(default)]
    pub options: Vec<String>,
    /// Snapshots every permission and power of the proposal is evaluated at
    #[serde(default)]
    pub snapshots: Snapshots,
}

impl Validate for Proposal {
    fn validate(&self) -> Result<()> {
        require_text("community", &self.community)?;
        require_text("group", &self.group)?;
        require_text("title", &self.title)?;

        let mut seen = HashSet::new();
        for option in &self.options {
            require_text("option", option)?;
            if !seen.insert(option.as_str()) {
                return Err(Error::schema(format!("duplicate option '{}'", option)));
            }
        }
        Ok(())
    }
}
