//! PostgreSQL profile.
//!
//! - Double-quoted identifiers, `TRUE`/`FALSE` literals, `||` concat
//! - Interval arithmetic for date math, `EPOCH` extraction for diffs
//! - Native `~` regex operator
//! - Session context via `current_setting('app.*')`
//! - Safe division via `NULLIF`

use super::helpers;
use super::{
    AggStyle, DialectFamily, DialectProfile, PatternMatch, RegexStyle, TimeArith, TimeIntelStyle,
};

pub(super) static PROFILE: DialectProfile = DialectProfile {
    name: "postgres",
    family: DialectFamily::Sql,
    ident_open: "\"",
    ident_close: "\"",
    string_quote: '\'',
    true_lit: "TRUE",
    false_lit: "FALSE",
    null_lit: "NULL",
    concat_op: "||",
    current_timestamp: "NOW()",
    null_safe_divide: false,
    pattern_match: PatternMatch::LikeConcat,
    regex: RegexStyle::Tilde,
    time_arith: TimeArith::IntervalEpoch,
    agg_style: AggStyle::Sql,
    time_intel: TimeIntelStyle::DateFromParts,
    tenant_expr: Some("current_setting('app.tenant_id')"),
    user_id_expr: Some("current_setting('app.user_id')"),
    user_role_expr: None,
    user_roles_expr: None,
    casts: helpers::CASTS_ANSI,
};
