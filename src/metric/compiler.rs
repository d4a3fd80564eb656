//! Metric compiler: renders metric trees to measure text.
//!
//! One pure recursive function per node kind, consulting the active
//! dialect profile. Structural divergence between target families is
//! expressed through the profile's closed enum tags (`AggStyle`,
//! `TimeIntelStyle`, `DialectFamily`), never by comparing target names.
//!
//! Cross-metric references resolve against an immutable lookup supplied
//! at construction; unresolved references render as placeholders so the
//! compiler never fails on forward references. Ordering is the caller's
//! problem by design.

use std::collections::HashMap;

use serde_json::{json, Value};

use crate::dialect::{AggStyle, DialectFamily, DialectProfile, Target, TimeIntelStyle};
use crate::value::ScalarValue;

use super::ast::{AggFunc, FieldRef, MetricExpr, TimeIntelFunc};
use super::deps;
use super::parser;

/// Result of compiling one metric.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CompiledMetric {
    pub metric_code: String,
    pub target: String,
    pub expression: String,
    /// Referenced metric codes, sorted and unique.
    pub dependencies: Vec<String>,
    pub notes: Option<String>,
}

/// Compiles metric expressions for one target.
///
/// Construct one per compilation job. The metrics lookup is an immutable
/// snapshot of already-compiled expressions; it is only read during
/// `compile`, so a parsed tree can be compiled concurrently for several
/// targets.
#[derive(Debug, Clone)]
pub struct MetricCompiler {
    target: Target,
    profile: &'static DialectProfile,
    metrics: HashMap<String, String>,
}

impl MetricCompiler {
    pub fn new(target: Target) -> Self {
        MetricCompiler {
            target,
            profile: target.profile(),
            metrics: HashMap::new(),
        }
    }

    /// Compiler with a snapshot of already-compiled metric expressions
    /// for cross-metric reference resolution.
    pub fn with_metrics(target: Target, metrics: HashMap<String, String>) -> Self {
        MetricCompiler {
            target,
            profile: target.profile(),
            metrics,
        }
    }

    pub fn target(&self) -> Target {
        self.target
    }

    /// Quote a `table.field` reference. The BI family addresses columns
    /// as `Table[Column]`; everything else uses dotted quoted segments.
    pub fn quote_field(&self, table: &str, field: &str) -> String {
        if self.profile.family == DialectFamily::Bi {
            return format!("{table}[{field}]");
        }
        if table.is_empty() {
            self.profile.quote_ident(field)
        } else {
            format!(
                "{}.{}",
                self.profile.quote_ident(table),
                self.profile.quote_ident(field)
            )
        }
    }

    /// Compile any metric expression to target text.
    pub fn compile(&self, expr: &MetricExpr) -> String {
        match expr {
            MetricExpr::Literal { value, .. } => self.compile_literal(value),
            MetricExpr::Field(field) => self.compile_field_ref(field),
            MetricExpr::Metric(code) => self.compile_metric_ref(code),
            MetricExpr::Agg { func, arg, filter } => {
                self.compile_agg(*func, arg, filter.as_deref())
            }
            MetricExpr::TimeIntel {
                func,
                metric,
                date_column,
                offset,
            } => self.compile_time_intel(*func, metric, date_column, *offset),
            MetricExpr::Arith { op, left, right } => format!(
                "({} {} {})",
                self.compile(left),
                op.symbol(),
                self.compile(right)
            ),
            MetricExpr::Cond {
                condition,
                then_expr,
                else_expr,
            } => self.compile_cond(condition, then_expr, else_expr.as_deref()),
            MetricExpr::Compare { op, left, right } => format!(
                "({} {} {})",
                self.compile(left),
                op.symbol(),
                self.compile(right)
            ),
            MetricExpr::Coalesce { args } => self.compile_coalesce(args),
            MetricExpr::Divide {
                numerator,
                denominator,
                alternate,
            } => self.compile_divide(numerator, denominator, alternate.as_deref()),
            MetricExpr::Window {
                func,
                metric,
                partition_by,
                order_by,
            } => self.compile_window(func, metric, partition_by.as_deref(), order_by.as_deref()),
        }
    }

    fn compile_literal(&self, value: &ScalarValue) -> String {
        match value {
            ScalarValue::Null => self.profile.null_lit.to_string(),
            ScalarValue::Bool(b) => {
                if *b {
                    self.profile.true_lit.to_string()
                } else {
                    self.profile.false_lit.to_string()
                }
            }
            ScalarValue::Int(i) => i.to_string(),
            ScalarValue::Float(f) => {
                let mut buffer = ryu::Buffer::new();
                buffer.format(*f).to_string()
            }
            ScalarValue::String(s) => self.profile.quote_string(s),
            ScalarValue::Opaque(v) => v.to_string(),
        }
    }

    fn compile_field_ref(&self, field: &FieldRef) -> String {
        self.quote_field(&field.table, &field.field)
    }

    fn compile_metric_ref(&self, code: &str) -> String {
        if let Some(compiled) = self.metrics.get(code) {
            return format!("({compiled})");
        }
        // Unresolved reference - placeholder, never an error.
        if self.profile.family == DialectFamily::Bi {
            format!("[{code}]")
        } else {
            format!("/* {code} */")
        }
    }

    fn compile_agg(&self, func: AggFunc, arg: &MetricExpr, filter: Option<&MetricExpr>) -> String {
        let inner = self.compile(arg);
        match self.profile.agg_style {
            AggStyle::Sql => self.compile_agg_sql(func, &inner, filter),
            AggStyle::Spark => self.compile_agg_spark(func, &inner, filter),
            AggStyle::Bi => self.compile_agg_bi(func, arg, &inner, filter),
            AggStyle::Host => self.compile_agg_host(func, &inner, filter),
        }
    }

    fn compile_agg_sql(&self, func: AggFunc, inner: &str, filter: Option<&MetricExpr>) -> String {
        // The set-shaped functions ignore any filter.
        let name = match func {
            AggFunc::DistinctCount => return format!("COUNT(DISTINCT {inner})"),
            AggFunc::CountRows => return "COUNT(*)".to_string(),
            AggFunc::Median => {
                return format!("PERCENTILE_CONT(0.5) WITHIN GROUP (ORDER BY {inner})")
            }
            AggFunc::Sum => "SUM",
            AggFunc::Count => "COUNT",
            AggFunc::Avg => "AVG",
            AggFunc::Min | AggFunc::First => "MIN",
            AggFunc::Max | AggFunc::Last => "MAX",
            AggFunc::Stdev => "STDEV",
            AggFunc::Var => "VAR",
        };

        match filter {
            Some(filter) => {
                let filter_sql = self.compile(filter);
                format!("SUM(CASE WHEN {filter_sql} THEN {inner} ELSE 0 END)")
            }
            None => format!("{name}({inner})"),
        }
    }

    fn compile_agg_spark(
        &self,
        func: AggFunc,
        inner: &str,
        filter: Option<&MetricExpr>,
    ) -> String {
        let name = match func {
            AggFunc::DistinctCount => return format!("COUNT(DISTINCT {inner})"),
            AggFunc::CountRows => return "COUNT(*)".to_string(),
            AggFunc::Median => return format!("PERCENTILE({inner}, 0.5)"),
            AggFunc::Sum => "SUM",
            AggFunc::Count => "COUNT",
            AggFunc::Avg => "AVG",
            AggFunc::Min => "MIN",
            AggFunc::Max => "MAX",
            AggFunc::First => "FIRST",
            AggFunc::Last => "LAST",
            AggFunc::Stdev => "STDDEV",
            AggFunc::Var => "VARIANCE",
        };

        match filter {
            Some(filter) => {
                let filter_sql = self.compile(filter);
                format!("SUM(CASE WHEN {filter_sql} THEN {inner} ELSE 0 END)")
            }
            None => format!("{name}({inner})"),
        }
    }

    fn compile_agg_bi(
        &self,
        func: AggFunc,
        arg: &MetricExpr,
        inner: &str,
        filter: Option<&MetricExpr>,
    ) -> String {
        let name = match func {
            // COUNTROWS takes the table, not a column, and ignores filters.
            AggFunc::CountRows => {
                return match arg {
                    MetricExpr::Field(field) => format!("COUNTROWS({})", field.table),
                    _ => format!("COUNTROWS({inner})"),
                }
            }
            AggFunc::Sum => "SUM",
            AggFunc::Count => "COUNT",
            AggFunc::Avg => "AVERAGE",
            AggFunc::Min => "MIN",
            AggFunc::Max => "MAX",
            AggFunc::DistinctCount => "DISTINCTCOUNT",
            AggFunc::First => "FIRSTNONBLANK",
            AggFunc::Last => "LASTNONBLANK",
            AggFunc::Stdev => "STDEV.P",
            AggFunc::Var => "VAR.P",
            AggFunc::Median => "MEDIAN",
        };

        let result = format!("{name}({inner})");
        match filter {
            Some(filter) => format!("CALCULATE({result}, {})", self.compile(filter)),
            None => result,
        }
    }

    fn compile_agg_host(
        &self,
        func: AggFunc,
        inner: &str,
        filter: Option<&MetricExpr>,
    ) -> String {
        let name = match func {
            AggFunc::CountRows => return "len(df)".to_string(),
            AggFunc::Sum => "sum",
            AggFunc::Count => "count",
            AggFunc::Avg => "mean",
            AggFunc::Min => "min",
            AggFunc::Max => "max",
            AggFunc::DistinctCount => "nunique",
            AggFunc::First => "first",
            AggFunc::Last => "last",
            AggFunc::Stdev => "std",
            AggFunc::Var => "var",
            AggFunc::Median => "median",
        };

        match filter {
            Some(filter) => {
                let filter_py = self.compile(filter);
                format!("df.loc[{filter_py}, {inner}].{name}()")
            }
            None => format!("df[{inner}].{name}()"),
        }
    }

    fn compile_time_intel(
        &self,
        func: TimeIntelFunc,
        metric: &MetricExpr,
        date_column: &FieldRef,
        offset: Option<i64>,
    ) -> String {
        let m = self.compile(metric);
        let d = self.compile_field_ref(date_column);

        match self.profile.time_intel {
            TimeIntelStyle::Calculate => self.time_intel_calculate(func, &m, &d, offset),
            TimeIntelStyle::DateFromParts => time_intel_datefromparts(func, &m, &d),
            TimeIntelStyle::DateTrunc => time_intel_datetrunc(func, &m, &d),
        }
    }

    fn time_intel_calculate(
        &self,
        func: TimeIntelFunc,
        m: &str,
        d: &str,
        offset: Option<i64>,
    ) -> String {
        // A zero offset means "unset" and defaults to one period back.
        let offset = offset.filter(|o| *o != 0).unwrap_or(-1);
        match func {
            TimeIntelFunc::Ytd => format!("TOTALYTD({m}, {d})"),
            TimeIntelFunc::Mtd => format!("TOTALMTD({m}, {d})"),
            TimeIntelFunc::Qtd => format!("TOTALQTD({m}, {d})"),
            TimeIntelFunc::Py | TimeIntelFunc::SamePeriodLastYear => {
                format!("CALCULATE({m}, SAMEPERIODLASTYEAR({d}))")
            }
            TimeIntelFunc::Pm | TimeIntelFunc::PreviousMonth => {
                format!("CALCULATE({m}, PREVIOUSMONTH({d}))")
            }
            TimeIntelFunc::Pq | TimeIntelFunc::PreviousQuarter => {
                format!("CALCULATE({m}, PREVIOUSQUARTER({d}))")
            }
            TimeIntelFunc::ParallelPeriod => {
                format!("CALCULATE({m}, PARALLELPERIOD({d}, {offset}, MONTH))")
            }
            TimeIntelFunc::DateAdd => format!("CALCULATE({m}, DATEADD({d}, {offset}, DAY))"),
            TimeIntelFunc::DatesYtd => format!("CALCULATE({m}, DATESYTD({d}))"),
            TimeIntelFunc::PreviousDay => format!("CALCULATE({m}, PREVIOUSDAY({d}))"),
            TimeIntelFunc::PreviousYear => format!("CALCULATE({m}, PREVIOUSYEAR({d}))"),
            // No direct equivalent - plain context transition.
            TimeIntelFunc::DatesMtd | TimeIntelFunc::DatesQtd => {
                format!("CALCULATE({m}, {d})")
            }
        }
    }

    fn compile_cond(
        &self,
        condition: &MetricExpr,
        then_expr: &MetricExpr,
        else_expr: Option<&MetricExpr>,
    ) -> String {
        let c = self.compile(condition);
        let t = self.compile(then_expr);

        match self.profile.family {
            DialectFamily::Bi => match else_expr {
                Some(else_expr) => format!("IF({c}, {t}, {})", self.compile(else_expr)),
                None => format!("IF({c}, {t})"),
            },
            DialectFamily::Host => {
                let e = else_expr
                    .map(|e| self.compile(e))
                    .unwrap_or_else(|| self.profile.null_lit.to_string());
                format!("({t} if {c} else {e})")
            }
            DialectFamily::Sql => match else_expr {
                Some(else_expr) => {
                    format!("CASE WHEN {c} THEN {t} ELSE {} END", self.compile(else_expr))
                }
                None => format!("CASE WHEN {c} THEN {t} END"),
            },
        }
    }

    fn compile_coalesce(&self, args: &[MetricExpr]) -> String {
        let compiled: Vec<String> = args.iter().map(|a| self.compile(a)).collect();
        let joined = compiled.join(", ");

        if self.profile.family == DialectFamily::Host {
            // First non-missing value over the argument sequence.
            return format!("next((x for x in [{joined}] if x is not None), None)");
        }
        format!("COALESCE({joined})")
    }

    fn compile_divide(
        &self,
        numerator: &MetricExpr,
        denominator: &MetricExpr,
        alternate: Option<&MetricExpr>,
    ) -> String {
        let num = self.compile(numerator);
        let den = self.compile(denominator);
        let alt = alternate
            .map(|a| self.compile(a))
            .unwrap_or_else(|| "0".to_string());

        match self.profile.family {
            DialectFamily::Bi => format!("DIVIDE({num}, {den}, {alt})"),
            DialectFamily::Host => format!("({num} / {den} if {den} != 0 else {alt})"),
            DialectFamily::Sql => {
                if self.profile.null_safe_divide {
                    format!("CASE WHEN {den} = 0 THEN {alt} ELSE {num} / {den} END")
                } else {
                    format!("({num} / NULLIF({den}, 0))")
                }
            }
        }
    }

    fn compile_window(
        &self,
        func: &str,
        metric: &MetricExpr,
        partition_by: Option<&[FieldRef]>,
        order_by: Option<&[FieldRef]>,
    ) -> String {
        let m = self.compile(metric);

        // The BI dialect has no window functions; render the inner metric.
        if self.profile.family == DialectFamily::Bi {
            return m;
        }

        let mut over_parts: Vec<String> = Vec::new();
        if let Some(cols) = partition_by {
            let cols: Vec<String> = cols.iter().map(|c| self.compile_field_ref(c)).collect();
            over_parts.push(format!("PARTITION BY {}", cols.join(", ")));
        }
        if let Some(cols) = order_by {
            let cols: Vec<String> = cols.iter().map(|c| self.compile_field_ref(c)).collect();
            over_parts.push(format!("ORDER BY {}", cols.join(", ")));
        }

        if over_parts.is_empty() {
            format!("{func}({m}) OVER ()")
        } else {
            format!("{func}({m}) OVER ({})", over_parts.join(" "))
        }
    }
}

// Conditional-sum synthesis of time intelligence for SQL targets. These
// templates are deliberate approximations pinned by golden tests; the
// unsupported functions fall back to the inner metric with no filtering.

fn time_intel_datefromparts(func: TimeIntelFunc, m: &str, d: &str) -> String {
    match func {
        TimeIntelFunc::Ytd => format!(
            "SUM(CASE WHEN {d} >= DATEFROMPARTS(YEAR({d}), 1, 1)\n                AND {d} <= GETDATE() THEN {m} ELSE 0 END)"
        ),
        TimeIntelFunc::Mtd => format!(
            "SUM(CASE WHEN {d} >= DATEFROMPARTS(YEAR({d}), MONTH({d}), 1)\n                AND {d} <= GETDATE() THEN {m} ELSE 0 END)"
        ),
        TimeIntelFunc::Qtd => format!(
            "SUM(CASE WHEN {d} >= DATEADD(QUARTER, DATEDIFF(QUARTER, 0, {d}), 0)\n                AND {d} <= GETDATE() THEN {m} ELSE 0 END)"
        ),
        TimeIntelFunc::Py => {
            format!("SUM(CASE WHEN YEAR({d}) = YEAR(GETDATE()) - 1 THEN {m} ELSE 0 END)")
        }
        TimeIntelFunc::Pm => format!(
            "SUM(CASE WHEN YEAR({d}) = YEAR(DATEADD(MONTH, -1, GETDATE()))\n                AND MONTH({d}) = MONTH(DATEADD(MONTH, -1, GETDATE())) THEN {m} ELSE 0 END)"
        ),
        _ => m.to_string(),
    }
}

fn time_intel_datetrunc(func: TimeIntelFunc, m: &str, d: &str) -> String {
    match func {
        TimeIntelFunc::Ytd => format!(
            "SUM(CASE WHEN {d} >= DATE_TRUNC('YEAR', CURRENT_DATE())\n                AND {d} <= CURRENT_DATE() THEN {m} ELSE 0 END)"
        ),
        TimeIntelFunc::Mtd => format!(
            "SUM(CASE WHEN {d} >= DATE_TRUNC('MONTH', CURRENT_DATE())\n                AND {d} <= CURRENT_DATE() THEN {m} ELSE 0 END)"
        ),
        TimeIntelFunc::Py => {
            format!("SUM(CASE WHEN YEAR({d}) = YEAR(CURRENT_DATE()) - 1 THEN {m} ELSE 0 END)")
        }
        _ => m.to_string(),
    }
}

/// Compile a metric definition document.
///
/// The definition may spell its keys the snapshot way (`code`/`formula`),
/// the API way (`metricCode`/`expressionLogical`), or the physical way
/// (`MT_Code`/`MT_FormulaJSON`). `metrics_lookup` is an optional snapshot
/// of already-compiled metric expressions for cross-metric references;
/// the caller owns compilation order.
pub fn compile_metric(
    metric_def: &Value,
    target: &str,
    metrics_lookup: Option<&HashMap<String, String>>,
) -> CompiledMetric {
    let code = first_str(metric_def, &["code", "metricCode", "MT_Code"])
        .unwrap_or("Unknown")
        .to_string();
    let empty = json!({});
    let formula = metric_def
        .get("formula")
        .or_else(|| metric_def.get("expressionLogical"))
        .or_else(|| metric_def.get("MT_FormulaJSON"))
        .unwrap_or(&empty);

    let resolved = Target::parse(target);
    let compiler = match metrics_lookup {
        Some(lookup) => MetricCompiler::with_metrics(resolved, lookup.clone()),
        None => MetricCompiler::new(resolved),
    };

    let expr = parser::parse_formula(formula);
    let expression = compiler.compile(&expr);
    let dependencies = deps::dependencies(&expr);

    CompiledMetric {
        metric_code: code,
        target: resolved.to_string(),
        expression,
        dependencies,
        notes: first_str(metric_def, &["notes"]).map(str::to_string),
    }
}

fn first_str<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| value.get(key).and_then(Value::as_str))
}
