//! Name -> function tables
//!
//! Boolean, decimal and number functions live in separate tables so a
//! boolean leaf can never resolve to a power function.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use voty_common::{Error, Result};

use crate::expr::{BooleanSets, DecimalSets};
use crate::functions::{
    BooleanFunction, DecimalFunction, NumberFunction, PrefixesDotSuffixExactMatch,
    PrefixesDotSuffixFixedPower,
};

/// Registry of policy leaf functions
#[derive(Clone)]
pub struct FunctionRegistry {
    boolean: HashMap<String, Arc<dyn BooleanFunction>>,
    decimal: HashMap<String, Arc<dyn DecimalFunction>>,
    number: HashMap<String, Arc<dyn NumberFunction>>,
}

impl FunctionRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self {
            boolean: HashMap::new(),
            decimal: HashMap::new(),
            number: HashMap::new(),
        }
    }

    /// Registry holding the built-in functions
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register_boolean(Arc::new(PrefixesDotSuffixExactMatch));
        registry.register_decimal(Arc::new(PrefixesDotSuffixFixedPower));
        registry.register_number(Arc::new(PrefixesDotSuffixFixedPower));
        registry
    }

    /// Register a boolean function, replacing any function of the same name
    pub fn register_boolean(&mut self, function: Arc<dyn BooleanFunction>) {
        debug!("Registering boolean function {}", function.name());
        self.boolean.insert(function.name().to_string(), function);
    }

    /// Register a decimal function, replacing any function of the same name
    pub fn register_decimal(&mut self, function: Arc<dyn DecimalFunction>) {
        debug!("Registering decimal function {}", function.name());
        self.decimal.insert(function.name().to_string(), function);
    }

    /// Register a number function, replacing any function of the same name
    pub fn register_number(&mut self, function: Arc<dyn NumberFunction>) {
        debug!("Registering number function {}", function.name());
        self.number.insert(function.name().to_string(), function);
    }

    pub fn boolean(&self, name: &str) -> Result<&Arc<dyn BooleanFunction>> {
        self.boolean
            .get(name)
            .ok_or_else(|| Error::UnknownFunction(name.to_string()))
    }

    pub fn decimal(&self, name: &str) -> Result<&Arc<dyn DecimalFunction>> {
        self.decimal
            .get(name)
            .ok_or_else(|| Error::UnknownFunction(name.to_string()))
    }

    pub fn number(&self, name: &str) -> Result<&Arc<dyn NumberFunction>> {
        self.number
            .get(name)
            .ok_or_else(|| Error::UnknownFunction(name.to_string()))
    }

    /// Sorted names of the registered boolean functions
    pub fn boolean_names(&self) -> Vec<&str> {
        sorted_names(self.boolean.keys())
    }

    /// Sorted names of the registered decimal functions
    pub fn decimal_names(&self) -> Vec<&str> {
        sorted_names(self.decimal.keys())
    }

    /// Sorted names of the registered number functions
    pub fn number_names(&self) -> Vec<&str> {
        sorted_names(self.number.keys())
    }

    /// Full structural check of a boolean tree: arity, depth, known functions
    /// and their arguments
    pub fn validate_boolean_sets(&self, expr: &BooleanSets) -> Result<()> {
        expr.validate(|name, arguments: &[Value]| self.boolean(name)?.validate_arguments(arguments))
    }

    /// Full structural check of a decimal tree
    pub fn validate_decimal_sets(&self, expr: &DecimalSets) -> Result<()> {
        expr.validate(|name, arguments: &[Value]| self.decimal(name)?.validate_arguments(arguments))
    }

    /// Full structural check of a decimal tree evaluated with numbers
    pub fn validate_number_sets(&self, expr: &DecimalSets) -> Result<()> {
        expr.validate(|name, arguments: &[Value]| self.number(name)?.validate_arguments(arguments))
    }
}

fn sorted_names<'a>(keys: impl Iterator<Item = &'a String>) -> Vec<&'a str> {
    let mut names: Vec<&str> = keys.map(String::as_str).collect();
    names.sort_unstable();
    names
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
