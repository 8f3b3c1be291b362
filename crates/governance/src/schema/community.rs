//! Community configuration documents

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use voty_common::{Error, Result};
use voty_policy::{BooleanSets, DecimalSets, FunctionRegistry};

use super::{require_text, Validate};

/// A community and the groups proposals are made in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Community {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slogan: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
    #[serde(default)]
    pub groups: Vec<Group>,
}

/// A workgroup with its own permissions and phase durations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
    pub permission: GroupPermission,
    pub duration: GroupDuration,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<Value>,
}

/// Who may act in a group, and with how much weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupPermission {
    pub proposing: BooleanSets,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adding_option: Option<BooleanSets>,
    pub voting: DecimalSets,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selecting: Option<BooleanSets>,
}

/// Phase lengths in seconds. Without `adding_option` the group has no
/// proposing phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDuration {
    pub announcing: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adding_option: Option<u64>,
    pub voting: u64,
}

impl Community {
    pub fn group(&self, id: &str) -> Option<&Group> {
        self.groups.iter().find(|group| group.id == id)
    }

    /// Check every policy of every group against the function registry
    pub fn validate_policies(&self, registry: &FunctionRegistry) -> Result<()> {
        for group in &self.groups {
            let permission = &group.permission;
            registry.validate_boolean_sets(&permission.proposing)?;
            if let Some(adding_option) = &permission.adding_option {
                registry.validate_boolean_sets(adding_option)?;
            }
            registry.validate_decimal_sets(&permission.voting)?;
            if let Some(selecting) = &permission.selecting {
                registry.validate_boolean_sets(selecting)?;
            }
        }
        Ok(())
    }
}

impl Validate for Community {
    fn validate(&self) -> Result<()> {
        require_text("name", &self.name)?;

        let mut ids = HashSet::new();
        for group in &self.groups {
            require_text("group.id", &group.id)?;
            require_text("group.name", &group.name)?;
            if !ids.insert(group.id.as_str()) {
                return Err(Error::schema(format!("duplicate group id '{}'", group.id)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn community_json() -> Value {
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
                        "operation": "max",
                        "operands": [{
                            "function": "prefixes_dot_suffix_fixed_power",
                            "arguments": ["bit", [], "1"]
                        }]
                    }
                },
                "duration": { "announcing": 3600, "voting": 86400 }
            }]
        })
    }

    #[test]
    fn test_parse_community() {
        let community: Community = serde_json::from_value(community_json()).unwrap();
        assert!(community.validate().is_ok());
        assert!(community.validate_policies(&FunctionRegistry::with_builtins()).is_ok());

        let group = community.group("council").unwrap();
        assert!(group.permission.adding_option.is_none());
        assert_eq!(group.duration.adding_option, None);
        assert!(community.group("treasury").is_none());
    }

    #[test]
    fn test_duplicate_group_ids() {
        let mut value = community_json();
        let group = value["groups"][0].clone();
        value["groups"].as_array_mut().unwrap().push(group);
        let community: Community = serde_json::from_value(value).unwrap();
        assert!(matches!(community.validate(), Err(Error::Schema(_))));
    }

    #[test]
    fn test_policy_validation() {
        let mut value = community_json();
        value["groups"][0]["permission"]["proposing"] = json!({
            "function": "holds_nft",
            "arguments": []
        });
        let community: Community = serde_json::from_value(value).unwrap();
        assert_eq!(
            community.validate_policies(&FunctionRegistry::with_builtins()),
            Err(Error::UnknownFunction("holds_nft".to_string()))
        );
    }

    #[test]
    fn test_mixed_trees_are_rejected() {
        let mut value = community_json();
        value["groups"][0]["permission"]["proposing"] = json!({
            "operation": "sum",
            "operands": [{ "function": "prefixes_dot_suffix_exact_match", "arguments": ["bit", []] }]
        });
        assert!(serde_json::from_value::<Community>(value).is_err());
    }
}
