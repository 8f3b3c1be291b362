//! Option documents, added to a proposal during its proposing phase

use serde::{Deserialize, Serialize};

use voty_common::Result;

use super::{require_text, Validate};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalOption {
    /// Permalink of the proposal
    pub proposal: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Validate for ProposalOption {
    fn validate(&self) -> Result<()> {
        require_text("proposal", &self.proposal)?;
        require_text("title", &self.title)
    }
}
