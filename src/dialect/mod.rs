//! Dialect profiles and the target registry.
//!
//! Each code-generation target gets one `DialectProfile`: a static record
//! of its lexical rules (quoting, literal spellings, concatenation, the
//! "now" expression, cast table) plus closed enum tags for the places
//! where targets genuinely diverge in structure rather than spelling:
//!
//! - Identifier quoting: `"` (ANSI/Postgres/Snowflake/Redshift),
//!   `` ` `` (Spark/BigQuery), `[]` (T-SQL), `'` (DAX), none (Python)
//! - Boolean literals: `TRUE`/`FALSE` vs `1`/`0` vs `True`/`False`
//! - String concatenation: `||` vs `+` vs `&`
//! - Safe division: `CASE WHEN` guard vs `NULLIF` pattern
//! - Regex matching: `~` vs `REGEXP_LIKE` vs `RLIKE` vs a `LIKE` fallback
//! - And more...
//!
//! Compilation code matches on the expression tag and consults the active
//! profile; it never branches on a target's name string.
//!
//! # Usage
//!
//! ```ignore
//! use refract::dialect::Target;
//!
//! let profile = Target::parse("sqlserver").profile();
//! assert_eq!(profile.quote_ident("Sales"), "[Sales]");
//! ```

mod ansi;
mod bigquery;
mod dax;
pub mod helpers;
mod postgres;
mod python;
mod redshift;
mod snowflake;
mod spark;
mod tsql;

/// Broad shape of the target language.
///
/// `Sql` targets share CASE/COALESCE/window syntax; the `Bi` target (DAX)
/// uses IF/CALCULATE/native time intelligence; the `Host` target (Python)
/// renders ternaries and pandas-style accessors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialectFamily {
    Sql,
    Bi,
    Host,
}

/// How `contains` is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternMatch {
    /// `CHARINDEX(needle, haystack) > 0` (T-SQL).
    CharIndex,
    /// `haystack LIKE '%' || needle || '%'` using the profile concat op.
    LikeConcat,
}

/// How `regex` is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegexStyle {
    /// T-SQL has no native regex; degrade to `LIKE`.
    Like,
    /// Postgres `~` operator.
    Tilde,
    /// `REGEXP_LIKE(expr, pattern)` (Snowflake and the ANSI default).
    RegexpLike,
    /// Spark `RLIKE`.
    RLike,
}

/// Date arithmetic primitives for `dateadd` / `datediffminutes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeArith {
    /// `DATEADD(unit, n, d)` / `DATEDIFF(MINUTE, a, b)`.
    DateAddDiff,
    /// `d + INTERVAL 'n unit'` / `EXTRACT(EPOCH FROM (b - a)) / 60`.
    IntervalEpoch,
    /// Spark `DATE_ADD` for days, interval arithmetic otherwise,
    /// `UNIX_TIMESTAMP` subtraction for minute differences.
    SparkUnix,
}

/// Aggregation function naming table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggStyle {
    /// T-SQL/ANSI names: STDEV, VAR, PERCENTILE_CONT, MIN/MAX for FIRST/LAST.
    Sql,
    /// Spark names: STDDEV, VARIANCE, PERCENTILE, native FIRST/LAST.
    Spark,
    /// DAX names: AVERAGE, DISTINCTCOUNT, COUNTROWS, FIRSTNONBLANK.
    Bi,
    /// pandas accessors: mean, nunique, std.
    Host,
}

/// Time-intelligence rendering strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeIntelStyle {
    /// Native DAX time intelligence wrapped in CALCULATE.
    Calculate,
    /// Conditional-sum ranges built from DATEFROMPARTS/GETDATE.
    DateFromParts,
    /// Conditional-sum ranges built from DATE_TRUNC/CURRENT_DATE.
    DateTrunc,
}

/// Static, per-target lexical configuration. Pure data; constructed once
/// per target and never mutated.
#[derive(Debug, Clone, Copy)]
pub struct DialectProfile {
    /// Registry name for display/logging.
    pub name: &'static str,
    pub family: DialectFamily,
    /// Identifier quote characters. Both empty for unquoted targets.
    pub ident_open: &'static str,
    pub ident_close: &'static str,
    pub string_quote: char,
    pub true_lit: &'static str,
    pub false_lit: &'static str,
    pub null_lit: &'static str,
    pub concat_op: &'static str,
    /// Expression yielding the current timestamp.
    pub current_timestamp: &'static str,
    /// Whether safe division renders a `CASE WHEN denominator = 0` guard
    /// (true) or a `NULLIF` pattern (false). A property of the dialect,
    /// not of the expression.
    pub null_safe_divide: bool,
    pub pattern_match: PatternMatch,
    pub regex: RegexStyle,
    pub time_arith: TimeArith,
    pub agg_style: AggStyle,
    pub time_intel: TimeIntelStyle,
    /// Session-context expressions; `None` falls back to a named
    /// parameter placeholder.
    pub tenant_expr: Option<&'static str>,
    pub user_id_expr: Option<&'static str>,
    pub user_role_expr: Option<&'static str>,
    pub user_roles_expr: Option<&'static str>,
    /// Logical cast name -> target-native type name.
    pub casts: &'static [(&'static str, &'static str)],
}

impl DialectProfile {
    /// Quote a single identifier segment, doubling any embedded close
    /// quote. Targets with no quote characters pass the name through.
    pub fn quote_ident(&self, ident: &str) -> String {
        helpers::quote_with(ident, self.ident_open, self.ident_close)
    }

    /// Quote a string literal, doubling the embedded quote character.
    pub fn quote_string(&self, s: &str) -> String {
        helpers::quote_string_with(s, self.string_quote)
    }

    /// Map a logical cast name through the profile cast table.
    /// Matching is case-insensitive; unknown names return `None` and the
    /// caller upper-cases the name verbatim.
    pub fn cast_type(&self, logical: &str) -> Option<&'static str> {
        let lowered = logical.to_lowercase();
        self.casts
            .iter()
            .find(|(key, _)| *key == lowered)
            .map(|(_, ty)| *ty)
    }
}

/// Supported code-generation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Target {
    TSql,
    Postgres,
    Snowflake,
    Spark,
    BigQuery,
    Redshift,
    Dax,
    Python,
    #[default]
    Ansi,
}

impl Target {
    /// Resolve a target name to a `Target`.
    ///
    /// Case-insensitive, alias-aware (`sqlserver` = `tsql`, `powerbi` =
    /// `dax`, `databricks`/`sparksql` = `spark`). Unknown names fall back
    /// to the ANSI profile rather than failing; new dialects are expected
    /// to be added without breaking existing callers.
    pub fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "tsql" | "sqlserver" => Target::TSql,
            "postgres" => Target::Postgres,
            "snowflake" => Target::Snowflake,
            "spark" | "databricks" | "sparksql" => Target::Spark,
            "bigquery" => Target::BigQuery,
            "redshift" => Target::Redshift,
            "dax" | "powerbi" => Target::Dax,
            "python" => Target::Python,
            _ => Target::Ansi,
        }
    }

    /// Get the profile for this target.
    pub fn profile(&self) -> &'static DialectProfile {
        match self {
            Target::TSql => &tsql::PROFILE,
            Target::Postgres => &postgres::PROFILE,
            Target::Snowflake => &snowflake::PROFILE,
            Target::Spark => &spark::PROFILE,
            Target::BigQuery => &bigquery::PROFILE,
            Target::Redshift => &redshift::PROFILE,
            Target::Dax => &dax::PROFILE,
            Target::Python => &python::PROFILE,
            Target::Ansi => &ansi::PROFILE,
        }
    }

    /// Every registered target, in registry order.
    pub fn all() -> &'static [Target] {
        &[
            Target::TSql,
            Target::Postgres,
            Target::Snowflake,
            Target::Spark,
            Target::BigQuery,
            Target::Redshift,
            Target::Dax,
            Target::Python,
            Target::Ansi,
        ]
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.profile().name)
    }
}
