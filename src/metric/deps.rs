//! Metric dependency extraction.
//!
//! A pure traversal that collects every metric code referenced anywhere
//! in a formula. It reports, it does not order: callers that compile
//! several interdependent metrics pre-compile dependencies themselves and
//! feed them back through the compiler's lookup.

use std::collections::BTreeSet;

use super::ast::MetricExpr;

/// Referenced metric codes, sorted and deduplicated.
pub fn dependencies(expr: &MetricExpr) -> Vec<String> {
    let mut found = BTreeSet::new();
    walk(expr, &mut found);
    found.into_iter().collect()
}

fn walk(expr: &MetricExpr, found: &mut BTreeSet<String>) {
    match expr {
        MetricExpr::Metric(code) => {
            found.insert(code.clone());
        }
        MetricExpr::Field(_) | MetricExpr::Literal { .. } => {}
        MetricExpr::Agg { arg, filter, .. } => {
            walk(arg, found);
            if let Some(filter) = filter {
                walk(filter, found);
            }
        }
        MetricExpr::TimeIntel { metric, .. } => walk(metric, found),
        MetricExpr::Arith { left, right, .. } => {
            walk(left, found);
            walk(right, found);
        }
        MetricExpr::Cond {
            condition,
            then_expr,
            else_expr,
        } => {
            walk(condition, found);
            walk(then_expr, found);
            if let Some(else_expr) = else_expr {
                walk(else_expr, found);
            }
        }
        MetricExpr::Compare { left, right, .. } => {
            walk(left, found);
            walk(right, found);
        }
        MetricExpr::Coalesce { args } => {
            for arg in args {
                walk(arg, found);
            }
        }
        MetricExpr::Divide {
            numerator,
            denominator,
            alternate,
        } => {
            walk(numerator, found);
            walk(denominator, found);
            if let Some(alternate) = alternate {
                walk(alternate, found);
            }
        }
        MetricExpr::Window { metric, .. } => walk(metric, found),
    }
}
