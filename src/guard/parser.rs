//! Guard document parser.
//!
//! Converts untyped JSON documents (or shorthand strings) into typed
//! `GuardExpr` trees. The parser never fails: shapes it cannot interpret
//! degrade to a deny-all literal (or an opaque literal for unknown
//! objects) so downstream compilation always terminates.

use serde_json::Value;

use super::ast::{GuardDocument, GuardExpr, GuardOp, ScalarValue};

/// Parse an expression node.
///
/// Dispatch order is significant and mirrors the document grammar:
/// scalars first, then string shorthand, then the discriminating keys
/// `lit`, `ref`, `op` in that order. Unknown object shapes become opaque
/// literals.
pub fn parse_expr(node: &Value) -> GuardExpr {
    match node {
        Value::Null => GuardExpr::Literal(ScalarValue::Null),
        Value::Bool(b) => GuardExpr::Literal(ScalarValue::Bool(*b)),
        Value::Number(_) => GuardExpr::Literal(ScalarValue::from_json(node)),
        Value::String(s) => parse_shorthand(s),
        Value::Object(map) => {
            if let Some(lit) = map.get("lit") {
                return GuardExpr::Literal(ScalarValue::from_json(lit));
            }
            if let Some(path) = map.get("ref").and_then(Value::as_str) {
                return GuardExpr::Ref {
                    path: path.to_string(),
                    cast: map.get("as").and_then(Value::as_str).map(str::to_string),
                };
            }
            if let Some(op) = map.get("op") {
                let name = op.as_str().unwrap_or_default();
                let args = map
                    .get("args")
                    .and_then(Value::as_array)
                    .map(|items| items.iter().map(parse_expr).collect())
                    .unwrap_or_default();
                return GuardExpr::Op {
                    op: GuardOp::parse(name),
                    args,
                };
            }
            GuardExpr::Literal(ScalarValue::Opaque(node.clone()))
        }
        // Arrays and anything else have no guard meaning.
        other => GuardExpr::Literal(ScalarValue::Opaque(other.clone())),
    }
}

/// Shorthand strings recognized inside expression position.
fn parse_shorthand(s: &str) -> GuardExpr {
    match s {
        "allow" | "true" | "1=1" => GuardExpr::bool(true),
        "deny" | "false" | "1=0" => GuardExpr::bool(false),
        "tenant" => GuardExpr::tenant_guard(),
        _ => GuardExpr::string(s),
    }
}

/// Parse a full guard document from an untyped value.
///
/// Strings go through the shorthand/JSON path; objects are unwrapped for
/// their envelope keys; anything else is a deny-all document.
pub fn parse_document(dsl: &Value) -> GuardDocument {
    match dsl {
        Value::String(s) => parse_document_str(s),
        Value::Object(map) => GuardDocument {
            kind: map
                .get("kind")
                .and_then(Value::as_str)
                .unwrap_or("Guard")
                .to_string(),
            version: map.get("version").and_then(Value::as_u64).unwrap_or(1),
            description: map
                .get("description")
                .and_then(Value::as_str)
                .map(str::to_string),
            params: map.get("params").cloned(),
            expr: map.get("expr").map(parse_expr),
        },
        _ => GuardDocument::with_expr(GuardExpr::bool(false)),
    }
}

/// Parse a guard document supplied as a string: shorthand first, then a
/// JSON object, otherwise deny-all.
pub fn parse_document_str(s: &str) -> GuardDocument {
    match s {
        "allow" | "true" | "1=1" => return GuardDocument::with_expr(GuardExpr::bool(true)),
        "deny" | "false" | "1=0" => return GuardDocument::with_expr(GuardExpr::bool(false)),
        "tenant" => return GuardDocument::with_expr(GuardExpr::tenant_guard()),
        _ => {}
    }
    match serde_json::from_str::<Value>(s) {
        Ok(parsed @ Value::Object(_)) => parse_document(&parsed),
        _ => GuardDocument::with_expr(GuardExpr::bool(false)),
    }
}
