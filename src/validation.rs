//! Pre-flight validation of guard and metric documents.
//!
//! The compilers themselves are total: malformed input degrades to safe
//! literals and unknown names become generic function calls. Snapshot
//! loaders that want to reject questionable documents *before* they reach
//! a compiler use this module instead; nothing in the compile path
//! depends on it.

use serde_json::Value;
use thiserror::Error;

use crate::guard::{self, GuardExpr, GuardOp, ScalarValue};
use crate::metric::ast::{AggFunc, TimeIntelFunc};

/// Problems a document can carry without stopping compilation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Operator name not in the guard grammar; compiles as a generic
    /// function call.
    #[error("unknown guard operator '{0}'")]
    UnknownOperator(String),

    /// Aggregation name not in the metric grammar; compiles as SUM.
    #[error("unknown aggregation function '{0}'")]
    UnknownAggregation(String),

    /// Time-intelligence name not in the metric grammar; compiles as YTD.
    #[error("unknown time intelligence function '{0}'")]
    UnknownTimeIntel(String),

    /// Operator received the wrong number of arguments.
    #[error("operator '{op}' expects {expected} argument(s), found {found}")]
    BadArity {
        op: String,
        expected: &'static str,
        found: usize,
    },

    /// Document shape neither grammar understands; compiles as an opaque
    /// literal.
    #[error("uninterpretable document shape: {0}")]
    UninterpretableShape(String),
}

/// Validate a guard document. `Ok(())` means the compiled output will
/// contain no placeholders-for-garbage.
pub fn validate_guard(dsl: &Value) -> Result<(), Vec<ValidationError>> {
    let document = guard::parse_document(dsl);
    let mut errors = Vec::new();
    if let Some(expr) = &document.expr {
        walk_guard(expr, &mut errors);
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn walk_guard(expr: &GuardExpr, errors: &mut Vec<ValidationError>) {
    match expr {
        GuardExpr::Literal(ScalarValue::Opaque(shape)) => {
            errors.push(ValidationError::UninterpretableShape(shape.to_string()));
        }
        GuardExpr::Literal(_) | GuardExpr::Ref { .. } => {}
        GuardExpr::Op { op, args } => {
            check_guard_arity(op, args.len(), errors);
            if let GuardOp::Custom(name) = op {
                errors.push(ValidationError::UnknownOperator(name.clone()));
            }
            for arg in args {
                walk_guard(arg, errors);
            }
        }
    }
}

fn check_guard_arity(op: &GuardOp, found: usize, errors: &mut Vec<ValidationError>) {
    let expected: Option<(&'static str, bool)> = match op {
        GuardOp::Not | GuardOp::IsNull | GuardOp::IsNotNull | GuardOp::Exists => {
            Some(("exactly 1", found == 1))
        }
        GuardOp::Eq
        | GuardOp::Ne
        | GuardOp::Gt
        | GuardOp::Gte
        | GuardOp::Lt
        | GuardOp::Lte
        | GuardOp::Add
        | GuardOp::Sub
        | GuardOp::Mul
        | GuardOp::Div
        | GuardOp::Contains
        | GuardOp::StartsWith
        | GuardOp::EndsWith
        | GuardOp::Regex
        | GuardOp::DateDiffMinutes => Some(("exactly 2", found == 2)),
        GuardOp::In | GuardOp::And | GuardOp::Or | GuardOp::Concat | GuardOp::Coalesce => {
            Some(("at least 2", found >= 2))
        }
        GuardOp::DateAdd => Some(("exactly 3", found == 3)),
        GuardOp::Case => Some(("at least 2", found >= 2)),
        GuardOp::Custom(_) => None,
    };

    if let Some((expected, ok)) = expected {
        if !ok {
            errors.push(ValidationError::BadArity {
                op: format!("{op:?}").to_lowercase(),
                expected,
                found,
            });
        }
    }
}

/// Validate a metric formula document.
pub fn validate_metric(formula: &Value) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    walk_metric_document(formula, &mut errors);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

// The metric parser silently defaults unknown function names, so the
// checks here run over the raw document rather than the parsed tree.
fn walk_metric_document(node: &Value, errors: &mut Vec<ValidationError>) {
    match node {
        Value::Object(map) => {
            if let Some(name) = map.get("agg").and_then(Value::as_str) {
                let upper = name.to_uppercase();
                if !AggFunc::ALL.iter().any(|f| f.as_str() == upper) {
                    errors.push(ValidationError::UnknownAggregation(name.to_string()));
                }
            }
            if let Some(name) = map.get("timeIntel").and_then(Value::as_str) {
                let upper = name.to_uppercase();
                if !TimeIntelFunc::ALL.iter().any(|f| f.as_str() == upper) {
                    errors.push(ValidationError::UnknownTimeIntel(name.to_string()));
                }
            }
            for value in map.values() {
                walk_metric_document(value, errors);
            }
        }
        Value::Array(items) => {
            for item in items {
                walk_metric_document(item, errors);
            }
        }
        _ => {}
    }
}
