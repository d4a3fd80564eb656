//! DAX (Power BI) profile.
//!
//! The BI formula language diverges structurally from SQL:
//! - Field references render as `Table[Column]`
//! - Double-quoted strings, `&` concatenation
//! - `IF` instead of `CASE`, `CALCULATE` filters, native `DIVIDE`
//! - Native time intelligence (TOTALYTD, SAMEPERIODLASTYEAR, ...)
//! - No window functions; window expressions render the inner metric

use super::helpers;
use super::{
    AggStyle, DialectFamily, DialectProfile, PatternMatch, RegexStyle, TimeArith, TimeIntelStyle,
};

pub(super) static PROFILE: DialectProfile = DialectProfile {
    name: "dax",
    family: DialectFamily::Bi,
    ident_open: "'",
    ident_close: "'",
    string_quote: '"',
    true_lit: "TRUE",
    false_lit: "FALSE",
    null_lit: "NULL",
    concat_op: "&",
    current_timestamp: "NOW()",
    null_safe_divide: true,
    pattern_match: PatternMatch::LikeConcat,
    regex: RegexStyle::RegexpLike,
    time_arith: TimeArith::DateAddDiff,
    agg_style: AggStyle::Bi,
    time_intel: TimeIntelStyle::Calculate,
    tenant_expr: None,
    user_id_expr: None,
    user_role_expr: None,
    user_roles_expr: None,
    casts: helpers::CASTS_ANSI,
};
