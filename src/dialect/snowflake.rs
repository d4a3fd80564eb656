//! Snowflake profile.
//!
//! ANSI-style quoting and literals; `DATEADD`/`DATEDIFF` date math like
//! T-SQL; `REGEXP_LIKE` for regex; session context through the VARIANT
//! session object.

use super::helpers;
use super::{
    AggStyle, DialectFamily, DialectProfile, PatternMatch, RegexStyle, TimeArith, TimeIntelStyle,
};

pub(super) static PROFILE: DialectProfile = DialectProfile {
    name: "snowflake",
    family: DialectFamily::Sql,
    ident_open: "\"",
    ident_close: "\"",
    string_quote: '\'',
    true_lit: "TRUE",
    false_lit: "FALSE",
    null_lit: "NULL",
    concat_op: "||",
    current_timestamp: "CURRENT_TIMESTAMP()",
    null_safe_divide: false,
    pattern_match: PatternMatch::LikeConcat,
    regex: RegexStyle::RegexpLike,
    time_arith: TimeArith::DateAddDiff,
    agg_style: AggStyle::Sql,
    time_intel: TimeIntelStyle::DateFromParts,
    tenant_expr: Some("CURRENT_SESSION()::VARIANT:tenant_id"),
    user_id_expr: Some("CURRENT_USER()"),
    user_role_expr: None,
    user_roles_expr: None,
    casts: helpers::CASTS_ANSI,
};
