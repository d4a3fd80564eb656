//! Spark SQL (Databricks) profile.
//!
//! - Backtick identifier quoting
//! - `DATE_ADD` for day offsets, interval arithmetic otherwise,
//!   `UNIX_TIMESTAMP` subtraction for minute differences
//! - `RLIKE` regex
//! - Unity Catalog resolves identity through `current_user()`
//! - Spark-specific aggregate names (STDDEV, VARIANCE, PERCENTILE) and
//!   native FIRST/LAST

use super::helpers;
use super::{
    AggStyle, DialectFamily, DialectProfile, PatternMatch, RegexStyle, TimeArith, TimeIntelStyle,
};

pub(super) static PROFILE: DialectProfile = DialectProfile {
    name: "spark",
    family: DialectFamily::Sql,
    ident_open: "`",
    ident_close: "`",
    string_quote: '\'',
    true_lit: "TRUE",
    false_lit: "FALSE",
    null_lit: "NULL",
    concat_op: "||",
    current_timestamp: "CURRENT_TIMESTAMP()",
    null_safe_divide: false,
    pattern_match: PatternMatch::LikeConcat,
    regex: RegexStyle::RLike,
    time_arith: TimeArith::SparkUnix,
    agg_style: AggStyle::Spark,
    time_intel: TimeIntelStyle::DateTrunc,
    tenant_expr: Some("current_user()"),
    user_id_expr: Some("current_user()"),
    user_role_expr: None,
    user_roles_expr: None,
    casts: helpers::CASTS_ANSI,
};
