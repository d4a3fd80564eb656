//! BigQuery profile.
//!
//! Backtick quoting with otherwise ANSI-style lexicals. Session context
//! is unavailable; tenant/user references fall back to named parameters.

use super::helpers;
use super::{
    AggStyle, DialectFamily, DialectProfile, PatternMatch, RegexStyle, TimeArith, TimeIntelStyle,
};

pub(super) static PROFILE: DialectProfile = DialectProfile {
    name: "bigquery",
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
    regex: RegexStyle::RegexpLike,
    time_arith: TimeArith::DateAddDiff,
    agg_style: AggStyle::Sql,
    time_intel: TimeIntelStyle::DateFromParts,
    tenant_expr: None,
    user_id_expr: None,
    user_role_expr: None,
    user_roles_expr: None,
    casts: helpers::CASTS_ANSI,
};
