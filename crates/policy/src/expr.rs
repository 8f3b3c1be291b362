//! Policy expression trees
//!
//! A policy is either an operation over non-empty operands or a leaf that
//! calls a registered function. Boolean and decimal trees are separate types
//! so they can never be mixed.
//!
//! ```json
//! { "operation": "or", "operands": [
//!     { "function": "prefixes_dot_suffix_exact_match", "arguments": ["bit", ["alice"]] },
//!     { "function": "prefixes_dot_suffix_exact_match", "arguments": ["bit", ["bob"]] }
//! ] }
//! ```

use std::fmt::Debug;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use voty_common::{Error, Result};

/// Deepest nesting accepted by [`PolicyExpr::validate`]
pub const MAX_POLICY_DEPTH: usize = 16;

/// Operator of a combinator node
pub trait Operator: Copy + Debug + PartialEq + Send + Sync {
    /// Wire name of the operator
    fn name(&self) -> &'static str;

    /// Exact operand count, if the operator is fixed-arity
    fn exact_arity(&self) -> Option<usize> {
        None
    }
}

/// Boolean combinators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BooleanOperation {
    /// True iff any operand is true
    Or,
    /// True iff all operands are true
    And,
    /// Negation of the single operand
    Not,
}

impl Operator for BooleanOperation {
    fn name(&self) -> &'static str {
        match self {
            BooleanOperation::Or => "or",
            BooleanOperation::And => "and",
            BooleanOperation::Not => "not",
        }
    }

    fn exact_arity(&self) -> Option<usize> {
        match self {
            BooleanOperation::Not => Some(1),
            _ => None,
        }
    }
}

/// Decimal (voting power) combinators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecimalOperation {
    /// Greatest operand value
    Max,
    /// Sum of operand values
    Sum,
}

impl Operator for DecimalOperation {
    fn name(&self) -> &'static str {
        match self {
            DecimalOperation::Max => "max",
            DecimalOperation::Sum => "sum",
        }
    }
}

/// A policy expression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PolicyExpr<O> {
    /// Combinator over sub-expressions
    Operation {
        operation: O,
        operands: Vec<PolicyExpr<O>>,
    },
    /// Call of a registered function
    Function {
        function: String,
        arguments: Vec<Value>,
    },
}

/// Who may act
pub type BooleanSets = PolicyExpr<BooleanOperation>;

/// How much weight an actor carries; also used by the number variant
pub type DecimalSets = PolicyExpr<DecimalOperation>;

impl<O: Operator> PolicyExpr<O> {
    /// Build a combinator node
    pub fn operation(operation: O, operands: Vec<PolicyExpr<O>>) -> Self {
        PolicyExpr::Operation { operation, operands }
    }

    /// Build a function leaf
    pub fn function(function: impl Into<String>, arguments: Vec<Value>) -> Self {
        PolicyExpr::Function {
            function: function.into(),
            arguments,
        }
    }

    /// Check the operand count of this node only
    pub fn check_arity(&self) -> Result<()> {
        if let PolicyExpr::Operation { operation, operands } = self {
            if operands.is_empty() {
                return Err(Error::arity(format!(
                    "'{}' requires at least one operand",
                    operation.name()
                )));
            }
            if let Some(expected) = operation.exact_arity() {
                if operands.len() != expected {
                    return Err(Error::arity(format!(
                        "'{}' requires exactly {} operand(s), got {}",
                        operation.name(),
                        expected,
                        operands.len()
                    )));
                }
            }
        }
        Ok(())
    }

    /// Check arity and depth of the whole tree and hand every leaf to
    /// `check_leaf`
    pub fn validate<F>(&self, mut check_leaf: F) -> Result<()>
    where
        F: FnMut(&str, &[Value]) -> Result<()>,
    {
        let mut stack = vec![(self, 1usize)];
        while let Some((node, depth)) = stack.pop() {
            if depth > MAX_POLICY_DEPTH {
                return Err(Error::schema(format!(
                    "policy nested deeper than {} levels",
                    MAX_POLICY_DEPTH
                )));
            }
            node.check_arity()?;
            match node {
                PolicyExpr::Operation { operands, .. } => {
                    stack.extend(operands.iter().map(|operand| (operand, depth + 1)));
                }
                PolicyExpr::Function { function, arguments } => check_leaf(function, arguments)?,
            }
        }
        Ok(())
    }

    /// Every `(function, arguments)` leaf of the tree
    pub fn leaves(&self) -> Vec<(&str, &[Value])> {
        let mut leaves = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                PolicyExpr::Operation { operands, .. } => stack.extend(operands.iter()),
                PolicyExpr::Function { function, arguments } => {
                    leaves.push((function.as_str(), arguments.as_slice()))
                }
            }
        }
        leaves
    }
}
