//! Guard compiler: renders guard trees to boolean fragments.
//!
//! A pure recursive walk over the tree, consulting the active dialect
//! profile for lexical detail. Comparison and boolean operators always
//! parenthesize their result so fragments compose without precedence
//! surprises. The compiler never fails: unknown operators render as
//! upper-cased function calls and missing operands degrade to the
//! profile's null literal.

use std::collections::HashMap;

use serde_json::Value;

use crate::dialect::{DialectProfile, PatternMatch, RegexStyle, Target, TimeArith};

use super::ast::{GuardExpr, GuardOp, ScalarValue};
use super::parser;

/// Rendered output of a guard compilation, usable as a WHERE-clause
/// fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledGuard {
    pub target: String,
    pub where_clause: String,
}

/// Compiles guard expressions for one target.
///
/// Construct one per compilation job; the compiler holds no mutable
/// state and the same parsed tree can be compiled concurrently for
/// several targets.
#[derive(Debug, Clone)]
pub struct GuardCompiler {
    target: Target,
    profile: &'static DialectProfile,
    /// Caller-supplied reference overrides; an exact path match wins over
    /// every other resolution rule.
    overrides: HashMap<String, String>,
}

impl GuardCompiler {
    pub fn new(target: Target) -> Self {
        GuardCompiler {
            target,
            profile: target.profile(),
            overrides: HashMap::new(),
        }
    }

    /// Compiler with caller-supplied context overrides.
    pub fn with_overrides(target: Target, overrides: HashMap<String, String>) -> Self {
        GuardCompiler {
            target,
            profile: target.profile(),
            overrides,
        }
    }

    pub fn target(&self) -> Target {
        self.target
    }

    /// Compile a guard document. A document without an expression
    /// compiles to the profile's true literal: no guard means allow-all.
    pub fn compile_guard(&self, dsl: &Value) -> String {
        let expr = match dsl {
            Value::String(s) => parser::parse_document_str(s).expr,
            Value::Object(map) => {
                if let Some(raw) = map.get("expr") {
                    Some(parser::parse_expr(raw))
                } else if map.contains_key("op")
                    || map.contains_key("ref")
                    || map.contains_key("lit")
                {
                    Some(parser::parse_expr(dsl))
                } else {
                    parser::parse_document(dsl).expr
                }
            }
            _ => Some(GuardExpr::bool(false)),
        };

        match expr {
            Some(expr) => self.compile(&expr),
            None => self.profile.true_lit.to_string(),
        }
    }

    /// Compile any expression node.
    pub fn compile(&self, expr: &GuardExpr) -> String {
        match expr {
            GuardExpr::Literal(value) => self.compile_literal(value),
            GuardExpr::Ref { path, cast } => self.compile_ref(path, cast.as_deref()),
            GuardExpr::Op { op, args } => self.compile_op(op, args),
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
            ScalarValue::Opaque(v) => self.profile.quote_string(&v.to_string()),
        }
    }

    fn compile_ref(&self, path: &str, cast: Option<&str>) -> String {
        // Exact override match wins over all other rules.
        if let Some(mapped) = self.overrides.get(path) {
            return mapped.clone();
        }

        if let Some(key) = path.strip_prefix("context.") {
            return match key {
                "tenantId" => self
                    .profile
                    .tenant_expr
                    .unwrap_or("@TenantId")
                    .to_string(),
                "userId" => self.profile.user_id_expr.unwrap_or("@UserId").to_string(),
                "now" => self.profile.current_timestamp.to_string(),
                // Unknown context key - named parameter placeholder.
                other => format!("@{other}"),
            };
        }

        if let Some(field) = path.strip_prefix("user.") {
            return match field {
                "role" => self
                    .profile
                    .user_role_expr
                    .unwrap_or("@UserRole")
                    .to_string(),
                "roles" => self
                    .profile
                    .user_roles_expr
                    .unwrap_or("@UserRoles")
                    .to_string(),
                other => format!("@User_{other}"),
            };
        }

        // Regular column reference: quote each dotted segment.
        let quoted = path
            .split('.')
            .map(|segment| self.profile.quote_ident(segment))
            .collect::<Vec<_>>()
            .join(".");

        match cast {
            Some(cast) => self.apply_cast(&quoted, cast),
            None => quoted,
        }
    }

    fn apply_cast(&self, expr: &str, cast: &str) -> String {
        let sql_type = self
            .profile
            .cast_type(cast)
            .map(str::to_string)
            .unwrap_or_else(|| cast.to_uppercase());
        format!("CAST({expr} AS {sql_type})")
    }

    fn compile_op(&self, op: &GuardOp, args: &[GuardExpr]) -> String {
        let compiled: Vec<String> = args.iter().map(|a| self.compile(a)).collect();
        // Missing operands degrade to the null literal rather than failing.
        let arg = |i: usize| -> String {
            compiled
                .get(i)
                .cloned()
                .unwrap_or_else(|| self.profile.null_lit.to_string())
        };

        match op {
            GuardOp::And => format!("({})", compiled.join(" AND ")),
            GuardOp::Or => format!("({})", compiled.join(" OR ")),
            GuardOp::Not => format!("(NOT {})", arg(0)),

            GuardOp::Eq => format!("({} = {})", arg(0), arg(1)),
            GuardOp::Ne => format!("({} <> {})", arg(0), arg(1)),
            GuardOp::Gt => format!("({} > {})", arg(0), arg(1)),
            GuardOp::Gte => format!("({} >= {})", arg(0), arg(1)),
            GuardOp::Lt => format!("({} < {})", arg(0), arg(1)),
            GuardOp::Lte => format!("({} <= {})", arg(0), arg(1)),

            GuardOp::In => {
                let values = compiled.get(1..).unwrap_or_default().join(", ");
                format!("({} IN ({values}))", arg(0))
            }

            GuardOp::IsNull => format!("({} IS NULL)", arg(0)),
            GuardOp::IsNotNull => format!("({} IS NOT NULL)", arg(0)),

            GuardOp::Add => format!("({} + {})", arg(0), arg(1)),
            GuardOp::Sub => format!("({} - {})", arg(0), arg(1)),
            GuardOp::Mul => format!("({} * {})", arg(0), arg(1)),
            GuardOp::Div => format!("({} / {})", arg(0), arg(1)),

            GuardOp::Contains => self.compile_contains(&arg(0), &arg(1)),
            GuardOp::StartsWith => format!(
                "({} LIKE {} {} '%')",
                arg(0),
                arg(1),
                self.profile.concat_op
            ),
            GuardOp::EndsWith => format!(
                "({} LIKE '%' {} {})",
                arg(0),
                self.profile.concat_op,
                arg(1)
            ),
            GuardOp::Concat => {
                let sep = format!(" {} ", self.profile.concat_op);
                format!("({})", compiled.join(&sep))
            }
            GuardOp::Regex => self.compile_regex(&arg(0), &arg(1)),

            GuardOp::DateAdd => self.compile_dateadd(&compiled),
            GuardOp::DateDiffMinutes => self.compile_datediff_minutes(&arg(0), &arg(1)),

            GuardOp::Coalesce => format!("COALESCE({})", compiled.join(", ")),
            GuardOp::Case => self.compile_case(args),
            GuardOp::Exists => format!("EXISTS ({})", arg(0)),

            GuardOp::Custom(name) => {
                format!("{}({})", name.to_uppercase(), compiled.join(", "))
            }
        }
    }

    fn compile_contains(&self, field: &str, value: &str) -> String {
        match self.profile.pattern_match {
            PatternMatch::CharIndex => format!("(CHARINDEX({value}, {field}) > 0)"),
            PatternMatch::LikeConcat => {
                let op = self.profile.concat_op;
                format!("({field} LIKE '%' {op} {value} {op} '%')")
            }
        }
    }

    fn compile_regex(&self, field: &str, pattern: &str) -> String {
        match self.profile.regex {
            // No native regex - LIKE approximation.
            RegexStyle::Like => format!("({field} LIKE {pattern})"),
            RegexStyle::Tilde => format!("({field} ~ {pattern})"),
            RegexStyle::RegexpLike => format!("(REGEXP_LIKE({field}, {pattern}))"),
            RegexStyle::RLike => format!("({field} RLIKE {pattern})"),
        }
    }

    /// args: [unit, amount, date]
    fn compile_dateadd(&self, args: &[String]) -> String {
        if args.len() < 3 {
            return self.profile.null_lit.to_string();
        }
        let (amount, date) = (&args[1], &args[2]);
        // The unit may arrive as a quoted literal.
        let unit = args[0].trim_matches(|c| c == '\'' || c == '"').to_uppercase();

        match self.profile.time_arith {
            TimeArith::DateAddDiff => format!("DATEADD({unit}, {amount}, {date})"),
            TimeArith::IntervalEpoch => format!("({date} + INTERVAL '{amount} {unit}')"),
            TimeArith::SparkUnix => {
                if unit == "DAY" || unit == "DAYS" {
                    format!("DATE_ADD({date}, {amount})")
                } else {
                    format!("({date} + INTERVAL {amount} {unit})")
                }
            }
        }
    }

    fn compile_datediff_minutes(&self, date1: &str, date2: &str) -> String {
        match self.profile.time_arith {
            TimeArith::DateAddDiff => format!("DATEDIFF(MINUTE, {date1}, {date2})"),
            TimeArith::IntervalEpoch => {
                format!("EXTRACT(EPOCH FROM ({date2} - {date1})) / 60")
            }
            TimeArith::SparkUnix => {
                format!("(UNIX_TIMESTAMP({date2}) - UNIX_TIMESTAMP({date1})) / 60")
            }
        }
    }

    /// args: [cond1, result1, cond2, result2, ..., else_result?]
    fn compile_case(&self, args: &[GuardExpr]) -> String {
        let mut parts = vec!["CASE".to_string()];
        let mut i = 0;
        while i + 1 < args.len() {
            let cond = self.compile(&args[i]);
            let result = self.compile(&args[i + 1]);
            parts.push(format!("WHEN {cond} THEN {result}"));
            i += 2;
        }
        if i < args.len() {
            parts.push(format!("ELSE {}", self.compile(&args[i])));
        }
        parts.push("END".to_string());
        parts.join(" ")
    }
}

/// Compile a guard document for a named target.
pub fn compile_dsl(dsl: &Value, target: &str) -> String {
    GuardCompiler::new(Target::parse(target)).compile_guard(dsl)
}

/// Convenience wrapper returning the full output record.
pub fn compile_guard_to_sql(dsl: &Value, target: &str) -> CompiledGuard {
    let resolved = Target::parse(target);
    CompiledGuard {
        target: resolved.to_string(),
        where_clause: GuardCompiler::new(resolved).compile_guard(dsl),
    }
}
