//! Metric formula parser.
//!
//! Accepts shorthand strings (`"SUM(Sales.Amount)"`, `"[TotalSales]"`,
//! `"Sales.Amount"`, `"42"`) and nested documents. Structural dispatch
//! checks discriminating keys in a fixed priority order - `lit` before
//! `timeIntel` before `agg` before `metric` before `ref` before `op` -
//! so compound expressions are never mistaken for simple references.
//!
//! The parser is total: anything it cannot interpret becomes a literal.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::value::ScalarValue;

use super::ast::{AggFunc, ArithOp, CompareOp, FieldRef, MetricExpr, TimeIntelFunc};

/// Shorthand aggregation: `FUNC(inner)`, case-insensitive function name.
static AGG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?i)([A-Z]+)\((.*)\)$").unwrap());

/// Parse a field reference node.
///
/// Accepted shapes:
/// - `{"table": "Sales", "field": "Amount"}`
/// - `{"ref": "Sales.Amount"}`
/// - a bare `"Sales.Amount"` string
pub fn parse_field_ref(node: &Value) -> FieldRef {
    if let Some(path) = node
        .get("ref")
        .and_then(Value::as_str)
        .or_else(|| node.as_str())
    {
        let alias = node
            .get("alias")
            .and_then(Value::as_str)
            .map(str::to_string);
        return match path.split_once('.') {
            Some((table, field)) => FieldRef {
                table: table.to_string(),
                field: field.to_string(),
                alias,
            },
            None => FieldRef {
                table: String::new(),
                field: path.to_string(),
                alias,
            },
        };
    }
    FieldRef {
        table: str_key(node, "table"),
        field: str_key(node, "field"),
        alias: node
            .get("alias")
            .and_then(Value::as_str)
            .map(str::to_string),
    }
}

fn str_key(node: &Value, key: &str) -> String {
    node.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Parse a metric formula document into an expression tree.
pub fn parse_formula(node: &Value) -> MetricExpr {
    match node {
        Value::String(s) => parse_string_formula(s),
        Value::Bool(b) => MetricExpr::Literal {
            value: ScalarValue::Bool(*b),
            ty: Some("bool".to_string()),
        },
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                MetricExpr::Literal {
                    value: ScalarValue::Int(i),
                    ty: Some("int".to_string()),
                }
            } else {
                MetricExpr::Literal {
                    value: ScalarValue::Float(n.as_f64().unwrap_or(0.0)),
                    ty: Some("float".to_string()),
                }
            }
        }
        Value::Object(map) => parse_object(node, map),
        other => MetricExpr::Literal {
            value: ScalarValue::from_json(other),
            ty: None,
        },
    }
}

/// Structural dispatch - key priority order matters.
fn parse_object(node: &Value, map: &Map<String, Value>) -> MetricExpr {
    if let Some(lit) = map.get("lit") {
        return MetricExpr::Literal {
            value: ScalarValue::from_json(lit),
            ty: map.get("type").and_then(Value::as_str).map(str::to_string),
        };
    }

    if map.contains_key("timeIntel") {
        return parse_time_intel(map);
    }

    if map.contains_key("agg") {
        return parse_agg(map);
    }

    // Simple metric reference - must be a string to qualify.
    if let Some(code) = map.get("metric").and_then(Value::as_str) {
        return MetricExpr::Metric(code.to_string());
    }

    if map.contains_key("ref") || (map.contains_key("table") && map.contains_key("field")) {
        return MetricExpr::Field(parse_field_ref(node));
    }

    if let Some(op) = map.get("op").and_then(Value::as_str) {
        if let Some(op) = ArithOp::parse(op) {
            return parse_binary(map, |left, right| MetricExpr::Arith {
                op,
                left: Box::new(left),
                right: Box::new(right),
            });
        }
        if let Some(op) = CompareOp::parse(op) {
            return parse_binary(map, |left, right| MetricExpr::Compare {
                op,
                left: Box::new(left),
                right: Box::new(right),
            });
        }
    }

    if let Some(cond) = map.get("if") {
        return MetricExpr::Cond {
            condition: Box::new(parse_formula(cond)),
            then_expr: Box::new(parse_or_empty(map.get("then"))),
            else_expr: map
                .get("else")
                .map(|e| Box::new(parse_formula(e))),
        };
    }

    if let Some(args) = map.get("coalesce").and_then(Value::as_array) {
        return MetricExpr::Coalesce {
            args: args.iter().map(parse_formula).collect(),
        };
    }

    if map.contains_key("divide") {
        return parse_divide(map);
    }

    if map.contains_key("window") {
        return parse_window(map);
    }

    // Unknown structure - literal.
    MetricExpr::Literal {
        value: ScalarValue::Opaque(node.clone()),
        ty: None,
    }
}

/// Parse string shorthand formulas.
///
/// Examples:
/// - `"[TotalSales]"` - metric reference
/// - `"SUM(Sales.Amount)"` - aggregation
/// - `"Sales.Amount"` - field reference
/// - `"42"` - numeric literal
fn parse_string_formula(s: &str) -> MetricExpr {
    let s = s.trim();

    // Metric reference: [MetricCode]
    if let Some(code) = s
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
    {
        return MetricExpr::Metric(code.to_string());
    }

    // Aggregation: FUNC(inner)
    if let Some(caps) = AGG_PATTERN.captures(s) {
        let name = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        let upper = name.to_uppercase();
        if let Some(func) = AggFunc::ALL.iter().copied().find(|f| f.as_str() == upper) {
            let inner = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
            return MetricExpr::agg(func, parse_string_formula(inner));
        }
    }

    // Field reference: table.field (but not a purely numeric token)
    if s.contains('.') && !is_numeric_token(s) {
        let (table, field) = s.split_once('.').unwrap_or((s, ""));
        return MetricExpr::Field(FieldRef::new(table, field));
    }

    // Numeric literal
    if s.contains('.') {
        if let Ok(f) = s.parse::<f64>() {
            return MetricExpr::Literal {
                value: ScalarValue::Float(f),
                ty: Some("float".to_string()),
            };
        }
    } else if let Ok(i) = s.parse::<i64>() {
        return MetricExpr::Literal {
            value: ScalarValue::Int(i),
            ty: Some("int".to_string()),
        };
    }

    // String literal
    MetricExpr::Literal {
        value: ScalarValue::String(s.to_string()),
        ty: Some("string".to_string()),
    }
}

/// True when the token is digits with interleaved `.`/`_` only.
fn is_numeric_token(s: &str) -> bool {
    let stripped: String = s.chars().filter(|&c| c != '.' && c != '_').collect();
    !stripped.is_empty() && stripped.chars().all(|c| c.is_ascii_digit())
}

fn parse_or_empty(node: Option<&Value>) -> MetricExpr {
    match node {
        Some(node) => parse_formula(node),
        None => MetricExpr::Literal {
            value: ScalarValue::Opaque(Value::Object(Map::new())),
            ty: None,
        },
    }
}

/// Binary operands arrive as `left`/`right` keys or a two-element `args`
/// array; a missing operand degrades to an empty literal.
fn parse_binary(
    map: &Map<String, Value>,
    build: impl FnOnce(MetricExpr, MetricExpr) -> MetricExpr,
) -> MetricExpr {
    let args = map.get("args").and_then(Value::as_array);
    let left = map
        .get("left")
        .or_else(|| args.and_then(|a| a.first()));
    let right = map
        .get("right")
        .or_else(|| args.and_then(|a| a.get(1)));
    build(parse_or_empty(left), parse_or_empty(right))
}

fn parse_agg(map: &Map<String, Value>) -> MetricExpr {
    let func = AggFunc::parse(map.get("agg").and_then(Value::as_str).unwrap_or_default());
    let arg = parse_or_empty(map.get("arg").or_else(|| map.get("field")));
    let filter = map.get("filter").map(|f| Box::new(parse_formula(f)));
    MetricExpr::Agg {
        func,
        arg: Box::new(arg),
        filter,
    }
}

fn parse_time_intel(map: &Map<String, Value>) -> MetricExpr {
    let func = TimeIntelFunc::parse(
        map.get("timeIntel")
            .and_then(Value::as_str)
            .unwrap_or_default(),
    );
    let metric = parse_or_empty(map.get("metric").or_else(|| map.get("arg")));
    let date_column = map
        .get("dateColumn")
        .or_else(|| map.get("date"))
        .map(parse_field_ref)
        .unwrap_or_else(|| FieldRef::new("", ""));
    let offset = map.get("offset").and_then(Value::as_i64);
    MetricExpr::TimeIntel {
        func,
        metric: Box::new(metric),
        date_column,
        offset,
    }
}

fn parse_divide(map: &Map<String, Value>) -> MetricExpr {
    if let Some(parts) = map.get("divide").and_then(Value::as_array) {
        if parts.len() >= 2 {
            return MetricExpr::Divide {
                numerator: Box::new(parse_formula(&parts[0])),
                denominator: Box::new(parse_formula(&parts[1])),
                alternate: parts.get(2).map(|alt| Box::new(parse_formula(alt))),
            };
        }
    }
    MetricExpr::Divide {
        numerator: Box::new(parse_or_empty(map.get("numerator"))),
        denominator: Box::new(parse_or_empty(map.get("denominator"))),
        alternate: map
            .get("alternate")
            .map(|alt| Box::new(parse_formula(alt))),
    }
}

fn parse_window(map: &Map<String, Value>) -> MetricExpr {
    let func = map
        .get("window")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_uppercase();
    let metric = parse_or_empty(map.get("metric").or_else(|| map.get("arg")));
    let partition_by = map
        .get("partitionBy")
        .and_then(Value::as_array)
        .map(|cols| cols.iter().map(parse_field_ref).collect());
    let order_by = map
        .get("orderBy")
        .and_then(Value::as_array)
        .map(|cols| cols.iter().map(parse_field_ref).collect());
    MetricExpr::Window {
        func,
        metric: Box::new(metric),
        partition_by,
        order_by,
    }
}
