//! Guard expression AST - dialect agnostic.
//!
//! Trees are immutable value objects with structural identity: parsed
//! once, compiled any number of times for different targets.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use crate::value::ScalarValue;

/// Guard operators.
///
/// `Custom` carries any unrecognized name; it renders as an upper-cased
/// function call over its compiled arguments rather than failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GuardOp {
    // Boolean
    And,
    Or,
    Not,
    // Comparison
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    IsNull,
    IsNotNull,
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    // String
    Contains,
    StartsWith,
    EndsWith,
    Concat,
    Regex,
    // Date
    DateAdd,
    DateDiffMinutes,
    // Special
    Coalesce,
    Case,
    Exists,
    Custom(String),
}

impl GuardOp {
    /// Resolve an operator name, case-insensitively. Unknown names become
    /// `Custom` and compile as generic function calls.
    pub fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "and" => GuardOp::And,
            "or" => GuardOp::Or,
            "not" => GuardOp::Not,
            "eq" => GuardOp::Eq,
            "ne" => GuardOp::Ne,
            "gt" => GuardOp::Gt,
            "gte" => GuardOp::Gte,
            "lt" => GuardOp::Lt,
            "lte" => GuardOp::Lte,
            "in" => GuardOp::In,
            "isnull" => GuardOp::IsNull,
            "isnotnull" => GuardOp::IsNotNull,
            "add" => GuardOp::Add,
            "sub" => GuardOp::Sub,
            "mul" => GuardOp::Mul,
            "div" => GuardOp::Div,
            "contains" => GuardOp::Contains,
            "startswith" => GuardOp::StartsWith,
            "endswith" => GuardOp::EndsWith,
            "concat" => GuardOp::Concat,
            "regex" => GuardOp::Regex,
            "dateadd" => GuardOp::DateAdd,
            "datediffminutes" => GuardOp::DateDiffMinutes,
            "coalesce" => GuardOp::Coalesce,
            "case" => GuardOp::Case,
            "exists" => GuardOp::Exists,
            _ => GuardOp::Custom(name.to_string()),
        }
    }
}

/// A guard expression.
///
/// Every variant must be handled in the compiler - exhaustive matching is
/// enforced by the compiler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GuardExpr {
    /// A literal value.
    Literal(ScalarValue),

    /// A reference to a field, a `context.*` variable, or a `user.*`
    /// attribute, with an optional logical cast.
    Ref {
        path: String,
        cast: Option<String>,
    },

    /// An operation over ordered arguments.
    Op {
        op: GuardOp,
        args: Vec<GuardExpr>,
    },
}

impl GuardExpr {
    /// Create a boolean literal.
    pub fn bool(value: bool) -> Self {
        GuardExpr::Literal(ScalarValue::Bool(value))
    }

    /// Create a string literal.
    pub fn string(value: impl Into<String>) -> Self {
        GuardExpr::Literal(ScalarValue::String(value.into()))
    }

    /// Create an un-cast reference.
    pub fn reference(path: impl Into<String>) -> Self {
        GuardExpr::Ref {
            path: path.into(),
            cast: None,
        }
    }

    /// Create an operation.
    pub fn op(op: GuardOp, args: Vec<GuardExpr>) -> Self {
        GuardExpr::Op { op, args }
    }

    /// The canonical tenant-isolation predicate produced by the
    /// `"tenant"` shorthand.
    pub fn tenant_guard() -> Self {
        GuardExpr::op(
            GuardOp::Eq,
            vec![
                GuardExpr::reference("_TenantID"),
                GuardExpr::reference("context.tenantId"),
            ],
        )
    }
}

/// A parsed guard document: the expression plus its envelope metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardDocument {
    pub kind: String,
    pub version: u64,
    pub description: Option<String>,
    pub params: Option<Value>,
    /// Absent expression means allow-all.
    pub expr: Option<GuardExpr>,
}

impl GuardDocument {
    pub(crate) fn with_expr(expr: GuardExpr) -> Self {
        GuardDocument {
            kind: "Guard".to_string(),
            version: 1,
            description: None,
            params: None,
            expr: Some(expr),
        }
    }
}
