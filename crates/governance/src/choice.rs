//! Choice tokens and power splitting
//!
//! A choice is carried in a vote as an opaque string. For `single` voting it
//! is the JSON-encoded option, for `approval` voting a JSON-encoded array of
//! distinct options. The empty string means nothing was chosen.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use voty_common::{Error, Result};

use crate::schema::{Vote, VotingType};
use crate::verified::Verified;

/// Smallest number of decimal places an approval split is carried to
pub const MIN_SPLIT_SCALE: u32 = 8;

/// Chosen options, sorted and without duplicates
pub fn parse_choice(voting_type: VotingType, token: &str) -> Result<Vec<String>> {
    if token.is_empty() {
        return Ok(Vec::new());
    }

    match voting_type {
        VotingType::Single => {
            let option: String = serde_json::from_str(token)
                .map_err(|_| Error::schema(format!("invalid single choice '{}'", token)))?;
            Ok(vec![option])
        }
        VotingType::Approval => {
            let options: Vec<String> = serde_json::from_str(token)
                .map_err(|_| Error::schema(format!("invalid approval choice '{}'", token)))?;
            Ok(options
                .into_iter()
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect())
        }
    }
}

fn encode(options: &BTreeSet<String>) -> Result<String> {
    if options.is_empty() {
        return Ok(String::new());
    }
    serde_json::to_string(options).map_err(|e| Error::schema(e.to_string()))
}

/// Select `option`. `single` replaces the previous choice, `approval`
/// toggles `option` in the set.
pub fn update_choice(voting_type: VotingType, token: &str, option: &str) -> Result<String> {
    match voting_type {
        VotingType::Single => {
            serde_json::to_string(option).map_err(|e| Error::schema(e.to_string()))
        }
        VotingType::Approval => {
            let mut options: BTreeSet<String> =
                parse_choice(voting_type, token)?.into_iter().collect();
            if !options.remove(option) {
                options.insert(option.to_string());
            }
            encode(&options)
        }
    }
}

/// Whether `option` is part of the choice
pub fn check_choice(voting_type: VotingType, token: &str, option: &str) -> Result<bool> {
    Ok(parse_choice(voting_type, token)?
        .iter()
        .any(|chosen| chosen == option))
}

pub fn is_choice_empty(voting_type: VotingType, token: &str) -> Result<bool> {
    Ok(parse_choice(voting_type, token)?.is_empty())
}

/// Power each chosen option receives from a vote of `power`.
///
/// An approval split gives each of the `n` options `power / n` truncated to
/// `max(8, scale(power))` decimal places, then hands the `k` leftover
/// smallest units to the first `k` options in sorted order, so the parts
/// always sum to `power` exactly.
pub fn power_of_choice(
    voting_type: VotingType,
    token: &str,
    power: Decimal,
) -> Result<BTreeMap<String, Decimal>> {
    if power.is_sign_negative() && !power.is_zero() {
        return Err(Error::schema("power must not be negative"));
    }
    let options = parse_choice(voting_type, token)?;
    if options.is_empty() {
        return Ok(BTreeMap::new());
    }
    if options.len() == 1 {
        return Ok(options.into_iter().map(|option| (option, power)).collect());
    }

    let mut scaled = power;
    scaled.rescale(power.scale().max(MIN_SPLIT_SCALE));
    let scale = scaled.scale();
    let units = scaled.mantissa();

    let n = options.len() as i128;
    let share = units / n;
    let leftover = (units % n) as usize;

    let part = |units: i128| {
        Decimal::try_from_i128_with_scale(units, scale)
            .map(|d| d.normalize())
            .map_err(|e| Error::schema(format!("cannot split power {}: {}", power, e)))
    };
    let base = part(share)?;
    let bumped = part(share + 1)?;

    Ok(options
        .into_iter()
        .enumerate()
        .map(|(i, option)| (option, if i < leftover { bumped } else { base }))
        .collect())
}

/// Accumulated power per option
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub powers: BTreeMap<String, Decimal>,
    /// Power of all counted votes
    pub total_power: Decimal,
    /// Number of counted voters
    pub voters: usize,
}

/// Tally verified votes. A voter's latest vote replaces earlier ones; votes
/// with an empty choice are not counted.
pub fn tally(voting_type: VotingType, votes: &[Verified<Vote>]) -> Result<Tally> {
    let mut latest: HashMap<&str, &Vote> = HashMap::new();
    for vote in votes {
        latest.insert(vote.author(), vote.document());
    }

    let mut result = Tally::default();
    for vote in latest.into_values() {
        let split = power_of_choice(voting_type, &vote.choice, vote.power)?;
        if split.is_empty() {
            continue;
        }

        for (option, power) in split {
            let entry = result.powers.entry(option).or_insert(Decimal::ZERO);
            *entry = checked_add(*entry, power)?;
        }
        result.total_power = checked_add(result.total_power, vote.power)?;
        result.voters += 1;
    }
    Ok(result)
}

fn checked_add(a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_add(b)
        .ok_or_else(|| Error::schema("tallied power overflows"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Signed;
    use serde_json::json;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn sum(split: &BTreeMap<String, Decimal>) -> Decimal {
        split.values().copied().sum()
    }

    #[test]
    fn test_single_round_trip() {
        let token = update_choice(VotingType::Single, "", "A").unwrap();
        assert_eq!(token, "\"A\"");
        let split = power_of_choice(VotingType::Single, &token, dec("100")).unwrap();
        assert_eq!(split, BTreeMap::from([("A".to_string(), dec("100"))]));

        let token = update_choice(VotingType::Single, &token, "B").unwrap();
        assert_eq!(parse_choice(VotingType::Single, &token).unwrap(), vec!["B"]);
    }

    #[test]
    fn test_approval_toggles() {
        let token = update_choice(VotingType::Approval, "", "b").unwrap();
        let token = update_choice(VotingType::Approval, &token, "a").unwrap();
        assert_eq!(token, r#"["a","b"]"#);
        assert!(check_choice(VotingType::Approval, &token, "a").unwrap());

        let token = update_choice(VotingType::Approval, &token, "a").unwrap();
        assert!(!check_choice(VotingType::Approval, &token, "a").unwrap());
        let token = update_choice(VotingType::Approval, &token, "b").unwrap();
        assert!(is_choice_empty(VotingType::Approval, &token).unwrap());
    }

    #[test]
    fn test_approval_split_is_exact() {
        let token = r#"["c","a","b"]"#;
        let split = power_of_choice(VotingType::Approval, token, dec("100")).unwrap();
        assert_eq!(sum(&split), dec("100"));
        assert_eq!(split["a"], dec("33.33333334"));
        assert_eq!(split["b"], dec("33.33333333"));
        assert_eq!(split["c"], dec("33.33333333"));

        let split = power_of_choice(VotingType::Approval, token, dec("0.0000000001")).unwrap();
        assert_eq!(sum(&split), dec("0.0000000001"));

        for n in 2..12 {
            let options: Vec<String> = (0..n).map(|i| format!("option-{}", i)).collect();
            let token = serde_json::to_string(&options).unwrap();
            for power in ["1", "7", "100", "12345.6789", "0.00000001"] {
                let split = power_of_choice(VotingType::Approval, &token, dec(power)).unwrap();
                assert_eq!(split.len(), n);
                assert_eq!(sum(&split), dec(power), "n = {}, power = {}", n, power);
            }
        }
    }

    #[test]
    fn test_duplicates_are_ignored() {
        let split = power_of_choice(VotingType::Approval, r#"["a","a"]"#, dec("10")).unwrap();
        assert_eq!(split, BTreeMap::from([("a".to_string(), dec("10"))]));
    }

    #[test]
    fn test_invalid_tokens() {
        assert!(matches!(
            parse_choice(VotingType::Single, "A"),
            Err(Error::Schema(_))
        ));
        assert!(matches!(
            parse_choice(VotingType::Approval, "\"A\""),
            Err(Error::Schema(_))
        ));
        assert!(power_of_choice(VotingType::Single, "", dec("1")).unwrap().is_empty());
    }

    fn verified_vote(author: &str, choice: &str, power: &str) -> Verified<Vote> {
        let signed = Signed::<Vote>::from_value(json!({
            "proposal": "memory://p",
            "choice": choice,
            "power": power,
            "authorship": { "author": author, "coin_type": 309, "snapshot": "1" },
            "proof": { "type": "eth_personal_sign", "address": "0x0", "signature": "1:" }
        }))
        .unwrap();
        Verified::new(signed)
    }

    #[test]
    fn test_tally() {
        let votes = vec![
            verified_vote("alice.bit", r#"["x","y"]"#, "10"),
            verified_vote("bob.bit", r#"["x"]"#, "1"),
            verified_vote("carol.bit", "", "5"),
            verified_vote("bob.bit", r#"["y"]"#, "2"),
        ];
        let result = tally(VotingType::Approval, &votes).unwrap();
        assert_eq!(result.voters, 2);
        assert_eq!(result.total_power, dec("12"));
        assert_eq!(result.powers["x"], dec("5"));
        assert_eq!(result.powers["y"], dec("7"));
    }
}
