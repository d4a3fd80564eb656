//! T-SQL (SQL Server / Azure SQL) profile.
//!
//! T-SQL has significant differences from ANSI:
//! - Square bracket identifier quoting (`[name]`)
//! - Numeric boolean literals (`1`/`0`)
//! - String concatenation with `+`
//! - `CHARINDEX` for substring tests
//! - No native regex; `regex` degrades to `LIKE`
//! - `SESSION_CONTEXT` for tenant/user/role lookups
//! - Safe division via an explicit `CASE WHEN denominator = 0` guard

use super::helpers;
use super::{
    AggStyle, DialectFamily, DialectProfile, PatternMatch, RegexStyle, TimeArith, TimeIntelStyle,
};

pub(super) static PROFILE: DialectProfile = DialectProfile {
    name: "tsql",
    family: DialectFamily::Sql,
    ident_open: "[",
    ident_close: "]",
    string_quote: '\'',
    true_lit: "1",
    false_lit: "0",
    null_lit: "NULL",
    concat_op: "+",
    current_timestamp: "GETUTCDATE()",
    null_safe_divide: true,
    pattern_match: PatternMatch::CharIndex,
    regex: RegexStyle::Like,
    time_arith: TimeArith::DateAddDiff,
    agg_style: AggStyle::Sql,
    time_intel: TimeIntelStyle::DateFromParts,
    tenant_expr: Some("SESSION_CONTEXT(N'TenantId')"),
    user_id_expr: Some("SESSION_CONTEXT(N'UserId')"),
    user_role_expr: Some("SESSION_CONTEXT(N'UserRole')"),
    user_roles_expr: Some("SESSION_CONTEXT(N'UserRoles')"),
    casts: helpers::CASTS_TSQL,
};
