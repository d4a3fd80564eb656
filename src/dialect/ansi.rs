//! ANSI SQL profile — the fallback for unknown target names.
//!
//! Real databases rarely speak pure ANSI; this profile exists so that an
//! unrecognized target still compiles to something syntactically valid
//! rather than failing.

use super::helpers;
use super::{
    AggStyle, DialectFamily, DialectProfile, PatternMatch, RegexStyle, TimeArith, TimeIntelStyle,
};

pub(super) static PROFILE: DialectProfile = DialectProfile {
    name: "ansi",
    family: DialectFamily::Sql,
    ident_open: "\"",
    ident_close: "\"",
    string_quote: '\'',
    true_lit: "TRUE",
    false_lit: "FALSE",
    null_lit: "NULL",
    concat_op: "||",
    current_timestamp: "CURRENT_TIMESTAMP",
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
