//! Policy evaluation for Voty
//!
//! A community describes, per action, who may act with a boolean tree
//! ([`BooleanSets`]) and how much weight they carry with a decimal tree
//! ([`DecimalSets`]). Trees are evaluated against an explicit snapshot map by
//! the [`PolicyEvaluator`], using leaf functions from a [`FunctionRegistry`].

pub mod coin_types;
pub mod evaluator;
pub mod expr;
pub mod functions;
pub mod registry;

pub use coin_types::{
    fetch_snapshots, required_coin_types_of_boolean_sets, required_coin_types_of_decimal_sets,
    required_coin_types_of_number_sets,
};
pub use evaluator::PolicyEvaluator;
pub use expr::{
    BooleanOperation, BooleanSets, DecimalOperation, DecimalSets, Operator, PolicyExpr,
    MAX_POLICY_DEPTH,
};
pub use functions::{BooleanFunction, DecimalFunction, NumberFunction};
pub use registry::FunctionRegistry;
