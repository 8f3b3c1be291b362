//! Group permissions
//!
//! Each action in a group is gated by one of its policies. Voting is gated by
//! the power policy: a DID may vote iff its power is positive.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use voty_common::{CoinType, Error, Result, Snapshots};
use voty_policy::{
    required_coin_types_of_boolean_sets, required_coin_types_of_decimal_sets, FunctionRegistry,
    PolicyEvaluator,
};

use crate::schema::{Community, Group};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Propose,
    AddOption,
    Vote,
    Select,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Propose => "propose",
            Action::AddOption => "add_option",
            Action::Vote => "vote",
            Action::Select => "select",
        }
    }
}

impl FromStr for Action {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "propose" => Ok(Action::Propose),
            "add_option" | "add-option" => Ok(Action::AddOption),
            "vote" => Ok(Action::Vote),
            "select" => Ok(Action::Select),
            other => Err(Error::schema(format!("unknown action '{}'", other))),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Group `group_id` of `community`, `Error::Schema` if there is none
pub fn find_group<'a>(community: &'a Community, group_id: &str) -> Result<&'a Group> {
    community.group(group_id).ok_or_else(|| {
        Error::schema(format!(
            "community '{}' has no group '{}'",
            community.name, group_id
        ))
    })
}

/// Every coin type any policy of `group` needs a snapshot for
pub fn required_coin_types_of_group(
    group: &Group,
    registry: &FunctionRegistry,
) -> Result<BTreeSet<CoinType>> {
    let permission = &group.permission;
    let mut coin_types = required_coin_types_of_boolean_sets(&permission.proposing, registry)?;
    coin_types.extend(required_coin_types_of_decimal_sets(&permission.voting, registry)?);
    for policy in [&permission.adding_option, &permission.selecting]
        .into_iter()
        .flatten()
    {
        coin_types.extend(required_coin_types_of_boolean_sets(policy, registry)?);
    }
    Ok(coin_types)
}

/// Voting power of `did` in `group`
pub async fn voting_power_in_group(
    evaluator: &PolicyEvaluator,
    group: &Group,
    did: &str,
    snapshots: &Snapshots,
) -> Result<Decimal> {
    evaluator
        .evaluate_decimal(&group.permission.voting, did, snapshots)
        .await
}

/// Whether `did` may perform `action` in `group`. A group without an
/// `adding_option` or `selecting` policy allows nobody to do either.
pub async fn can_act_in_group(
    evaluator: &PolicyEvaluator,
    group: &Group,
    action: Action,
    did: &str,
    snapshots: &Snapshots,
) -> Result<bool> {
    let permission = &group.permission;
    let allowed = match action {
        Action::Propose => {
            evaluator
                .evaluate_boolean(&permission.proposing, did, snapshots)
                .await?
        }
        Action::AddOption | Action::Select => {
            let policy = if action == Action::AddOption {
                &permission.adding_option
            } else {
                &permission.selecting
            };
            match policy {
                Some(policy) => evaluator.evaluate_boolean(policy, did, snapshots).await?,
                None => false,
            }
        }
        Action::Vote => voting_power_in_group(evaluator, group, did, snapshots).await? > Decimal::ZERO,
    };

    debug!("{} may {} in group {}: {}", did, action, group.id, allowed);
    Ok(allowed)
}

/// [`can_act_in_group`] for a group looked up by id
pub async fn can_act(
    evaluator: &PolicyEvaluator,
    community: &Community,
    group_id: &str,
    action: Action,
    did: &str,
    snapshots: &Snapshots,
) -> Result<bool> {
    let group = find_group(community, group_id)?;
    can_act_in_group(evaluator, group, action, did, snapshots).await
}
