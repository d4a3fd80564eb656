//! # Refract
//!
//! A portable expression and metric compiler: one intermediate
//! representation, many targets.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │        Guard / Metric Documents (JSON or shorthand)      │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [parser]
//! ┌─────────────────────────────────────────────────────────┐
//! │        Expression Trees (GuardExpr / MetricExpr)         │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [compiler + dialect profile]
//! ┌─────────────────────────────────────────────────────────┐
//! │   T-SQL │ Postgres │ Snowflake │ Spark │ BigQuery │ ...  │
//! │              DAX │ Python (pandas) │ ANSI                │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Parsing and compilation are total functions: malformed documents
//! degrade to safe literals, unknown operators render as generic
//! function calls, and unresolved metric references become placeholders.
//! Callers that want strict rejection up front use [`validation`].
//!
//! Trees are immutable after parsing and safe to compile concurrently
//! for several targets; the only state a compiler carries is its target
//! profile and an optional read-only snapshot of already-compiled
//! metrics.

pub mod dialect;
pub mod guard;
pub mod kpi;
pub mod metric;
pub mod validation;
pub mod value;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::dialect::{DialectFamily, DialectProfile, Target};
    pub use crate::guard::{
        compile_dsl, compile_guard_to_sql, CompiledGuard, GuardCompiler, GuardExpr, GuardOp,
    };
    pub use crate::kpi::{compile_kpi, CompiledKpi, KpiDirection};
    pub use crate::metric::{
        compile_metric, dependencies, parse_formula, AggFunc, CompiledMetric, FieldRef,
        MetricCompiler, MetricExpr, TimeIntelFunc,
    };
    pub use crate::value::ScalarValue;
}

// Also export the main entry points at the crate root.
pub use dialect::Target;
pub use guard::{compile_dsl, compile_guard_to_sql, GuardCompiler};
pub use kpi::compile_kpi;
pub use metric::{compile_metric, MetricCompiler};
