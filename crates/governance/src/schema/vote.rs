//! Vote documents

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use voty_common::{Error, Result};

use super::{require_text, Validate};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    /// Permalink of the proposal
    pub proposal: String,
    /// Choice token, see [`crate::choice`]
    pub choice: String,
    /// Voting power claimed by the voter
    pub power: Decimal,
}

impl Validate for Vote {
    fn validate(&self) -> Result<()> {
        require_text("proposal", &self.proposal)?;
        if self.power.is_sign_negative() && !self.power.is_zero() {
            return Err(Error::schema("power must not be negative"));
        }
        Ok(())
    }
}
