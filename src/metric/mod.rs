//! Metric grammar: numeric formulas compiled to measure definitions.
//!
//! A metric formula is either a shorthand string (`"SUM(Sales.Amount)"`,
//! `"[TotalSales]"`) or a nested document combining aggregation, time
//! intelligence, arithmetic, conditionals, safe division, and window
//! functions. Compilation renders it to a SELECT-list expression for the
//! SQL targets, a measure definition for DAX, or a pandas expression for
//! the Python target.
//!
//! Cross-metric references are resolved against an explicitly supplied,
//! immutable lookup of already-compiled metrics; a missing reference
//! renders as a placeholder rather than failing. Ordering multi-metric
//! compilation is the caller's responsibility - `deps::dependencies`
//! reports what a formula needs but deliberately does not order it.

pub mod ast;
pub mod compiler;
pub mod deps;
pub mod parser;

pub use ast::{AggFunc, ArithOp, CompareOp, FieldRef, MetricExpr, TimeIntelFunc};
pub use compiler::{compile_metric, CompiledMetric, MetricCompiler};
pub use deps::dependencies;
pub use parser::{parse_field_ref, parse_formula};
