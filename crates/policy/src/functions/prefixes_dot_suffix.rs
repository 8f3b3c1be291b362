//! `prefixes_dot_suffix_*` built-ins: membership of `<prefix>.<suffix>` DIDs
//!
//! Arguments are `[suffix, [prefix, ...]]`, plus a trailing power for the
//! fixed-power variants. An empty prefix list admits every DID ending in
//! `.<suffix>`. Matching is exact and case-sensitive.

use std::collections::BTreeSet;
use std::str::FromStr;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;

use voty_common::{CoinType, Error, Result, Snapshots};

use super::{BooleanFunction, DecimalFunction, NumberFunction};

/// Whether `did` is `<prefix>.<suffix>` for one of `prefixes`, or ends in
/// `.<suffix>` when `prefixes` is empty
pub fn prefixes_dot_suffix_matches<S: AsRef<str>>(did: &str, suffix: &str, prefixes: &[S]) -> bool {
    let Some(label) = did
        .strip_suffix(suffix)
        .and_then(|rest| rest.strip_suffix('.'))
    else {
        return false;
    };

    prefixes.is_empty() || prefixes.iter().any(|prefix| prefix.as_ref() == label)
}

fn parse_membership<'a>(
    name: &str,
    arguments: &'a [Value],
    expected: usize,
) -> Result<(&'a str, Vec<&'a str>)> {
    if arguments.len() != expected {
        return Err(Error::schema(format!(
            "{} expects {} arguments, got {}",
            name,
            expected,
            arguments.len()
        )));
    }

    let suffix = arguments[0]
        .as_str()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::schema(format!("{}: suffix must be a non-empty string", name)))?;

    let prefixes = arguments[1]
        .as_array()
        .ok_or_else(|| Error::schema(format!("{}: prefixes must be an array", name)))?
        .iter()
        .map(|prefix| {
            prefix
                .as_str()
                .ok_or_else(|| Error::schema(format!("{}: prefixes must be strings", name)))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok((suffix, prefixes))
}

fn parse_decimal_power(name: &str, value: &Value) -> Result<Decimal> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return Err(Error::schema(format!("{}: power must be a decimal", name))),
    };
    let power = Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| Error::schema(format!("{}: invalid power '{}'", name, text)))?;

    if power.is_sign_negative() && !power.is_zero() {
        return Err(Error::schema(format!("{}: power must not be negative", name)));
    }
    Ok(power)
}

fn parse_number_power(name: &str, value: &Value) -> Result<f64> {
    let power = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|p| p.is_finite())
    .ok_or_else(|| Error::schema(format!("{}: power must be a finite number", name)))?;

    if power < 0.0 {
        return Err(Error::schema(format!("{}: power must not be negative", name)));
    }
    Ok(power)
}

/// Boolean membership test
#[derive(Debug, Clone, Copy, Default)]
pub struct PrefixesDotSuffixExactMatch;

impl PrefixesDotSuffixExactMatch {
    pub const NAME: &'static str = "prefixes_dot_suffix_exact_match";
}

#[async_trait]
impl BooleanFunction for PrefixesDotSuffixExactMatch {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn validate_arguments(&self, arguments: &[Value]) -> Result<()> {
        parse_membership(Self::NAME, arguments, 2).map(|_| ())
    }

    fn required_coin_types(&self, _arguments: &[Value]) -> Result<BTreeSet<CoinType>> {
        Ok(BTreeSet::new())
    }

    async fn check(&self, arguments: &[Value], did: &str, _snapshots: &Snapshots) -> Result<bool> {
        let (suffix, prefixes) = parse_membership(Self::NAME, arguments, 2)?;
        Ok(prefixes_dot_suffix_matches(did, suffix, &prefixes))
    }
}

/// Fixed power for members, zero otherwise. Registered as both a decimal and
/// a number function.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrefixesDotSuffixFixedPower;

impl PrefixesDotSuffixFixedPower {
    pub const NAME: &'static str = "prefixes_dot_suffix_fixed_power";
}

#[async_trait]
impl DecimalFunction for PrefixesDotSuffixFixedPower {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn validate_arguments(&self, arguments: &[Value]) -> Result<()> {
        parse_membership(Self::NAME, arguments, 3)?;
        parse_decimal_power(Self::NAME, &arguments[2]).map(|_| ())
    }

    fn required_coin_types(&self, _arguments: &[Value]) -> Result<BTreeSet<CoinType>> {
        Ok(BTreeSet::new())
    }

    async fn calculate(
        &self,
        arguments: &[Value],
        did: &str,
        _snapshots: &Snapshots,
    ) -> Result<Decimal> {
        let (suffix, prefixes) = parse_membership(Self::NAME, arguments, 3)?;
        let power = parse_decimal_power(Self::NAME, &arguments[2])?;
        Ok(if prefixes_dot_suffix_matches(did, suffix, &prefixes) {
            power
        } else {
            Decimal::ZERO
        })
    }
}

#[async_trait]
impl NumberFunction for PrefixesDotSuffixFixedPower {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn validate_arguments(&self, arguments: &[Value]) -> Result<()> {
        parse_membership(Self::NAME, arguments, 3)?;
        parse_number_power(Self::NAME, &arguments[2]).map(|_| ())
    }

    fn required_coin_types(&self, _arguments: &[Value]) -> Result<BTreeSet<CoinType>> {
        Ok(BTreeSet::new())
    }

    async fn calculate(
        &self,
        arguments: &[Value],
        did: &str,
        _snapshots: &Snapshots,
    ) -> Result<f64> {
        let (suffix, prefixes) = parse_membership(Self::NAME, arguments, 3)?;
        let power = parse_number_power(Self::NAME, &arguments[2])?;
        Ok(if prefixes_dot_suffix_matches(did, suffix, &prefixes) {
            power
        } else {
            0.0
        })
    }
}
