//! Python (pandas) profile — the host-language evaluation form.
//!
//! - Unquoted identifiers, `True`/`False`/`None` literals
//! - Aggregations render as dataframe accessors (`df[...].sum()`)
//! - Conditionals render as ternaries, safe division as a guarded
//!   ternary, coalesce as a first-non-missing scan

use super::helpers;
use super::{
    AggStyle, DialectFamily, DialectProfile, PatternMatch, RegexStyle, TimeArith, TimeIntelStyle,
};

pub(super) static PROFILE: DialectProfile = DialectProfile {
    name: "python",
    family: DialectFamily::Host,
    ident_open: "",
    ident_close: "",
    string_quote: '"',
    true_lit: "True",
    false_lit: "False",
    null_lit: "None",
    concat_op: "+",
    current_timestamp: "datetime.utcnow()",
    null_safe_divide: true,
    pattern_match: PatternMatch::LikeConcat,
    regex: RegexStyle::RegexpLike,
    time_arith: TimeArith::DateAddDiff,
    agg_style: AggStyle::Host,
    time_intel: TimeIntelStyle::DateFromParts,
    tenant_expr: None,
    user_id_expr: None,
    user_role_expr: None,
    user_roles_expr: None,
    casts: helpers::CASTS_ANSI,
};
