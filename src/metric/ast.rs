//! Metric expression AST - dialect agnostic.
//!
//! Trees are immutable value objects with structural identity; the same
//! tree can be compiled to several targets concurrently. `Display`
//! renders the canonical shorthand form, so simple trees round-trip
//! through the string parser.

use serde::{Deserialize, Serialize};

use crate::value::ScalarValue;

/// Supported aggregation functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggFunc {
    Sum,
    Count,
    Avg,
    Min,
    Max,
    DistinctCount,
    CountRows,
    First,
    Last,
    Stdev,
    Var,
    Median,
}

impl AggFunc {
    /// All functions, in shorthand-match order.
    pub const ALL: &'static [AggFunc] = &[
        AggFunc::Sum,
        AggFunc::Count,
        AggFunc::Avg,
        AggFunc::Min,
        AggFunc::Max,
        AggFunc::DistinctCount,
        AggFunc::CountRows,
        AggFunc::First,
        AggFunc::Last,
        AggFunc::Stdev,
        AggFunc::Var,
        AggFunc::Median,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AggFunc::Sum => "SUM",
            AggFunc::Count => "COUNT",
            AggFunc::Avg => "AVG",
            AggFunc::Min => "MIN",
            AggFunc::Max => "MAX",
            AggFunc::DistinctCount => "DISTINCTCOUNT",
            AggFunc::CountRows => "COUNTROWS",
            AggFunc::First => "FIRST",
            AggFunc::Last => "LAST",
            AggFunc::Stdev => "STDEV",
            AggFunc::Var => "VAR",
            AggFunc::Median => "MEDIAN",
        }
    }

    /// Case-insensitive lookup; unknown names default to SUM.
    pub fn parse(name: &str) -> Self {
        let upper = name.to_uppercase();
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == upper)
            .unwrap_or(AggFunc::Sum)
    }
}

/// Supported time intelligence functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeIntelFunc {
    /// Year to date
    Ytd,
    /// Month to date
    Mtd,
    /// Quarter to date
    Qtd,
    /// Prior year
    Py,
    /// Prior month
    Pm,
    /// Prior quarter
    Pq,
    SamePeriodLastYear,
    ParallelPeriod,
    DateAdd,
    DatesYtd,
    DatesMtd,
    DatesQtd,
    PreviousDay,
    PreviousMonth,
    PreviousQuarter,
    PreviousYear,
}

impl TimeIntelFunc {
    pub const ALL: &'static [TimeIntelFunc] = &[
        TimeIntelFunc::Ytd,
        TimeIntelFunc::Mtd,
        TimeIntelFunc::Qtd,
        TimeIntelFunc::Py,
        TimeIntelFunc::Pm,
        TimeIntelFunc::Pq,
        TimeIntelFunc::SamePeriodLastYear,
        TimeIntelFunc::ParallelPeriod,
        TimeIntelFunc::DateAdd,
        TimeIntelFunc::DatesYtd,
        TimeIntelFunc::DatesMtd,
        TimeIntelFunc::DatesQtd,
        TimeIntelFunc::PreviousDay,
        TimeIntelFunc::PreviousMonth,
        TimeIntelFunc::PreviousQuarter,
        TimeIntelFunc::PreviousYear,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeIntelFunc::Ytd => "YTD",
            TimeIntelFunc::Mtd => "MTD",
            TimeIntelFunc::Qtd => "QTD",
            TimeIntelFunc::Py => "PY",
            TimeIntelFunc::Pm => "PM",
            TimeIntelFunc::Pq => "PQ",
            TimeIntelFunc::SamePeriodLastYear => "SAMEPERIODLASTYEAR",
            TimeIntelFunc::ParallelPeriod => "PARALLELPERIOD",
            TimeIntelFunc::DateAdd => "DATEADD",
            TimeIntelFunc::DatesYtd => "DATESYTD",
            TimeIntelFunc::DatesMtd => "DATESMTD",
            TimeIntelFunc::DatesQtd => "DATESQTD",
            TimeIntelFunc::PreviousDay => "PREVIOUSDAY",
            TimeIntelFunc::PreviousMonth => "PREVIOUSMONTH",
            TimeIntelFunc::PreviousQuarter => "PREVIOUSQUARTER",
            TimeIntelFunc::PreviousYear => "PREVIOUSYEAR",
        }
    }

    /// Case-insensitive lookup; unknown names default to YTD.
    pub fn parse(name: &str) -> Self {
        let upper = name.to_uppercase();
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == upper)
            .unwrap_or(TimeIntelFunc::Ytd)
    }
}

/// Arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl ArithOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
            ArithOp::Mod => "%",
        }
    }

    pub fn parse(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(ArithOp::Add),
            "-" => Some(ArithOp::Sub),
            "*" => Some(ArithOp::Mul),
            "/" => Some(ArithOp::Div),
            "%" => Some(ArithOp::Mod),
            _ => None,
        }
    }
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Lt,
    Gte,
    Lte,
}

impl CompareOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "<>",
            CompareOp::Gt => ">",
            CompareOp::Lt => "<",
            CompareOp::Gte => ">=",
            CompareOp::Lte => "<=",
        }
    }

    /// Accepts both the SQL spellings and the C-style `==`/`!=` aliases.
    pub fn parse(symbol: &str) -> Option<Self> {
        match symbol {
            "=" | "==" => Some(CompareOp::Eq),
            "<>" | "!=" => Some(CompareOp::Ne),
            ">" => Some(CompareOp::Gt),
            "<" => Some(CompareOp::Lt),
            ">=" => Some(CompareOp::Gte),
            "<=" => Some(CompareOp::Lte),
            _ => None,
        }
    }
}

/// Reference to a `table.field`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRef {
    pub table: String,
    pub field: String,
    pub alias: Option<String>,
}

impl FieldRef {
    pub fn new(table: impl Into<String>, field: impl Into<String>) -> Self {
        FieldRef {
            table: table.into(),
            field: field.into(),
            alias: None,
        }
    }
}

impl std::fmt::Display for FieldRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.table, self.field)
    }
}

/// A metric expression.
///
/// Every variant must be handled in the compiler and the dependency
/// walker - exhaustive matching is enforced by the compiler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MetricExpr {
    /// Reference to a table field.
    Field(FieldRef),

    /// Reference to another metric by code.
    Metric(String),

    /// Literal value with an optional logical type tag.
    Literal {
        value: ScalarValue,
        ty: Option<String>,
    },

    /// Aggregation, optionally filtered.
    Agg {
        func: AggFunc,
        arg: Box<MetricExpr>,
        filter: Option<Box<MetricExpr>>,
    },

    /// Time intelligence over an inner metric and a date column.
    TimeIntel {
        func: TimeIntelFunc,
        metric: Box<MetricExpr>,
        date_column: FieldRef,
        offset: Option<i64>,
    },

    /// Infix arithmetic.
    Arith {
        op: ArithOp,
        left: Box<MetricExpr>,
        right: Box<MetricExpr>,
    },

    /// Conditional with optional else branch.
    Cond {
        condition: Box<MetricExpr>,
        then_expr: Box<MetricExpr>,
        else_expr: Option<Box<MetricExpr>>,
    },

    /// Infix comparison.
    Compare {
        op: CompareOp,
        left: Box<MetricExpr>,
        right: Box<MetricExpr>,
    },

    /// First non-null of the arguments.
    Coalesce { args: Vec<MetricExpr> },

    /// Division with guarded zero denominator.
    Divide {
        numerator: Box<MetricExpr>,
        denominator: Box<MetricExpr>,
        alternate: Option<Box<MetricExpr>>,
    },

    /// Window function over an inner metric.
    Window {
        func: String,
        metric: Box<MetricExpr>,
        partition_by: Option<Vec<FieldRef>>,
        order_by: Option<Vec<FieldRef>>,
    },
}

impl MetricExpr {
    /// Create an integer literal.
    pub fn int(value: i64) -> Self {
        MetricExpr::Literal {
            value: ScalarValue::Int(value),
            ty: Some("int".to_string()),
        }
    }

    /// Create a metric reference.
    pub fn metric(code: impl Into<String>) -> Self {
        MetricExpr::Metric(code.into())
    }

    /// Create an unfiltered aggregation.
    pub fn agg(func: AggFunc, arg: MetricExpr) -> Self {
        MetricExpr::Agg {
            func,
            arg: Box::new(arg),
            filter: None,
        }
    }
}

fn fmt_scalar(value: &ScalarValue, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match value {
        ScalarValue::Null => write!(f, "None"),
        ScalarValue::Bool(b) => write!(f, "{}", if *b { "True" } else { "False" }),
        ScalarValue::Int(i) => write!(f, "{i}"),
        ScalarValue::Float(x) => {
            let mut buffer = ryu::Buffer::new();
            write!(f, "{}", buffer.format(*x))
        }
        ScalarValue::String(s) => write!(f, "\"{s}\""),
        ScalarValue::Opaque(v) => write!(f, "{v}"),
    }
}

impl std::fmt::Display for MetricExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricExpr::Field(field) => write!(f, "{field}"),
            MetricExpr::Metric(code) => write!(f, "[{code}]"),
            MetricExpr::Literal { value, .. } => fmt_scalar(value, f),
            MetricExpr::Agg { func, arg, filter } => match filter {
                Some(filter) => write!(f, "CALCULATE({}({arg}), {filter})", func.as_str()),
                None => write!(f, "{}({arg})", func.as_str()),
            },
            MetricExpr::TimeIntel {
                func,
                metric,
                date_column,
                offset,
            } => match offset {
                Some(offset) => {
                    write!(f, "{}({metric}, {date_column}, {offset})", func.as_str())
                }
                None => write!(f, "{}({metric}, {date_column})", func.as_str()),
            },
            MetricExpr::Arith { op, left, right } => {
                write!(f, "({left} {} {right})", op.symbol())
            }
            MetricExpr::Cond {
                condition,
                then_expr,
                else_expr,
            } => match else_expr {
                Some(else_expr) => write!(f, "IF({condition}, {then_expr}, {else_expr})"),
                None => write!(f, "IF({condition}, {then_expr})"),
            },
            MetricExpr::Compare { op, left, right } => {
                write!(f, "{left} {} {right}", op.symbol())
            }
            MetricExpr::Coalesce { args } => {
                let parts: Vec<String> = args.iter().map(|a| a.to_string()).collect();
                write!(f, "COALESCE({})", parts.join(", "))
            }
            MetricExpr::Divide {
                numerator,
                denominator,
                alternate,
            } => match alternate {
                Some(alternate) => {
                    write!(f, "DIVIDE({numerator}, {denominator}, {alternate})")
                }
                None => write!(f, "DIVIDE({numerator}, {denominator})"),
            },
            MetricExpr::Window {
                func,
                metric,
                partition_by,
                order_by,
            } => {
                write!(f, "{func}({metric})")?;
                if let Some(partition_by) = partition_by {
                    let cols: Vec<String> =
                        partition_by.iter().map(|c| c.to_string()).collect();
                    write!(f, " PARTITION BY {}", cols.join(", "))?;
                }
                if let Some(order_by) = order_by {
                    let cols: Vec<String> = order_by.iter().map(|c| c.to_string()).collect();
                    write!(f, " ORDER BY {}", cols.join(", "))?;
                }
                Ok(())
            }
        }
    }
}
