use refract::dialect::{DialectFamily, Target};

#[test]
fn test_registry_is_case_insensitive() {
    assert_eq!(Target::parse("TSQL"), Target::TSql);
    assert_eq!(Target::parse("tSqL"), Target::TSql);
    assert_eq!(Target::parse("POSTGRES"), Target::Postgres);
    assert_eq!(Target::parse("Snowflake"), Target::Snowflake);
}

#[test]
fn test_registry_aliases() {
    assert_eq!(Target::parse("sqlserver"), Target::TSql);
    assert_eq!(Target::parse("powerbi"), Target::Dax);
    assert_eq!(Target::parse("databricks"), Target::Spark);
    assert_eq!(Target::parse("sparksql"), Target::Spark);
}

#[test]
fn test_unknown_target_falls_back_to_ansi() {
    let profile = Target::parse("oracle").profile();
    assert_eq!(profile.name, "ansi");
    assert_eq!(profile.true_lit, "TRUE");
    assert_eq!(profile.quote_ident("users"), "\"users\"");
}

#[test]
fn test_profiles_are_static_and_consistent() {
    for target in Target::all() {
        let a = target.profile();
        let b = target.profile();
        // Same static instance both times.
        assert!(std::ptr::eq(a, b));
        assert!(!a.name.is_empty());
        assert!(!a.null_lit.is_empty());
        assert!(!a.current_timestamp.is_empty());
        assert!(!a.casts.is_empty());
    }
}

#[test]
fn test_family_assignments() {
    assert_eq!(Target::Dax.profile().family, DialectFamily::Bi);
    assert_eq!(Target::Python.profile().family, DialectFamily::Host);
    for target in [
        Target::TSql,
        Target::Postgres,
        Target::Snowflake,
        Target::Spark,
        Target::BigQuery,
        Target::Redshift,
        Target::Ansi,
    ] {
        assert_eq!(target.profile().family, DialectFamily::Sql, "{target}");
    }
}

#[test]
fn test_current_timestamp_spellings() {
    assert_eq!(Target::TSql.profile().current_timestamp, "GETUTCDATE()");
    assert_eq!(Target::Postgres.profile().current_timestamp, "NOW()");
    assert_eq!(
        Target::Snowflake.profile().current_timestamp,
        "CURRENT_TIMESTAMP()"
    );
    assert_eq!(Target::Ansi.profile().current_timestamp, "CURRENT_TIMESTAMP");
}

#[test]
fn test_concat_operators() {
    assert_eq!(Target::TSql.profile().concat_op, "+");
    assert_eq!(Target::Postgres.profile().concat_op, "||");
    assert_eq!(Target::Dax.profile().concat_op, "&");
}
