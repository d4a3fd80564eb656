use refract::dialect::Target;
use refract::guard::{compile_dsl, compile_guard_to_sql, GuardCompiler, GuardExpr};
use serde_json::json;
use std::collections::HashMap;

#[test]
fn test_default_allow_for_every_target() {
    // No guard = allow-all, for every registered target.
    for target in Target::all() {
        let compiler = GuardCompiler::new(*target);
        assert_eq!(
            compiler.compile_guard(&json!({})),
            target.profile().true_lit,
            "{target}"
        );
    }
}

#[test]
fn test_shorthand_equivalence_for_every_target() {
    for target in Target::all() {
        let compiler = GuardCompiler::new(*target);
        assert_eq!(
            compiler.compile_guard(&json!("allow")),
            compiler.compile_guard(&json!({"expr": true})),
            "{target}"
        );
        assert_eq!(
            compiler.compile_guard(&json!("deny")),
            compiler.compile_guard(&json!({"expr": false})),
            "{target}"
        );
    }
}

#[test]
fn test_tenant_shorthand_contains_tenant_context() {
    assert_eq!(
        compile_dsl(&json!("tenant"), "tsql"),
        "([_TenantID] = SESSION_CONTEXT(N'TenantId'))"
    );
    assert_eq!(
        compile_dsl(&json!("tenant"), "postgres"),
        "(\"_TenantID\" = current_setting('app.tenant_id'))"
    );
    assert_eq!(
        compile_dsl(&json!("tenant"), "snowflake"),
        "(\"_TenantID\" = CURRENT_SESSION()::VARIANT:tenant_id)"
    );
}

#[test]
fn test_compound_guard_tsql_and_postgres() {
    let dsl = json!({"expr": {"op": "and", "args": [
        {"op": "eq", "args": [{"ref": "Status"}, {"lit": "Active"}]},
        {"op": "in", "args": [{"ref": "Type"}, {"lit": "A"}, {"lit": "B"}]}
    ]}});

    assert_eq!(
        compile_dsl(&dsl, "tsql"),
        "(([Status] = 'Active') AND ([Type] IN ('A', 'B')))"
    );
    assert_eq!(
        compile_dsl(&dsl, "postgres"),
        "((\"Status\" = 'Active') AND (\"Type\" IN ('A', 'B')))"
    );
}

#[test]
fn test_string_literal_quote_round_trip() {
    // A literal containing the target's own string quote always compiles
    // with the embedded quote doubled.
    for target in Target::all() {
        let quote = target.profile().string_quote;
        let raw = format!("it{quote}s");
        let compiler = GuardCompiler::new(*target);
        let compiled = compiler.compile(&GuardExpr::string(raw.clone()));

        let doubled: String = [quote, quote].iter().collect();
        let expected = format!("{quote}{}{quote}", raw.replace(quote, &doubled));
        assert_eq!(compiled, expected, "{target}");

        // Strip the outer quotes; every embedded quote must be paired.
        let interior = &compiled[quote.len_utf8()..compiled.len() - quote.len_utf8()];
        assert_eq!(
            interior.matches(quote).count() % 2,
            0,
            "unescaped quote for {target}"
        );
    }
}

#[test]
fn test_context_now_uses_profile_timestamp() {
    let dsl = json!({"expr": {"op": "lte", "args": [{"ref": "ValidFrom"}, {"ref": "context.now"}]}});
    assert_eq!(
        compile_dsl(&dsl, "tsql"),
        "([ValidFrom] <= GETUTCDATE())"
    );
    assert_eq!(compile_dsl(&dsl, "postgres"), "(\"ValidFrom\" <= NOW())");
    assert_eq!(
        compile_dsl(&dsl, "spark"),
        "(`ValidFrom` <= CURRENT_TIMESTAMP())"
    );
}

#[test]
fn test_overrides_beat_every_resolution_rule() {
    let mut overrides = HashMap::new();
    overrides.insert("context.tenantId".to_string(), "42".to_string());
    overrides.insert("Orders.Region".to_string(), "'EMEA'".to_string());
    let compiler = GuardCompiler::with_overrides(Target::TSql, overrides);

    let dsl = json!({"expr": {"op": "and", "args": [
        {"op": "eq", "args": [{"ref": "_TenantID"}, {"ref": "context.tenantId"}]},
        {"op": "eq", "args": [{"ref": "Orders.Region"}, {"ref": "Orders.Region"}]}
    ]}});
    assert_eq!(
        compiler.compile_guard(&dsl),
        "(([_TenantID] = 42) AND ('EMEA' = 'EMEA'))"
    );
}

#[test]
fn test_guard_string_operators() {
    let dsl = json!({"expr": {"op": "startswith", "args": [{"ref": "Code"}, {"lit": "INV-"}]}});
    assert_eq!(compile_dsl(&dsl, "tsql"), "([Code] LIKE 'INV-' + '%')");
    assert_eq!(
        compile_dsl(&dsl, "postgres"),
        "(\"Code\" LIKE 'INV-' || '%')"
    );

    let dsl = json!({"expr": {"op": "concat", "args": [{"ref": "First"}, {"lit": " "}, {"ref": "Last"}]}});
    assert_eq!(
        compile_dsl(&dsl, "tsql"),
        "([First] + ' ' + [Last])"
    );
    assert_eq!(
        compile_dsl(&dsl, "postgres"),
        "(\"First\" || ' ' || \"Last\")"
    );
}

#[test]
fn test_guard_date_operators() {
    let dsl = json!({"expr": {"op": "datediffminutes", "args": [{"ref": "StartedAt"}, {"ref": "EndedAt"}]}});
    assert_eq!(
        compile_dsl(&dsl, "tsql"),
        "DATEDIFF(MINUTE, [StartedAt], [EndedAt])"
    );
    assert_eq!(
        compile_dsl(&dsl, "postgres"),
        "EXTRACT(EPOCH FROM (\"EndedAt\" - \"StartedAt\")) / 60"
    );
    assert_eq!(
        compile_dsl(&dsl, "spark"),
        "(UNIX_TIMESTAMP(`EndedAt`) - UNIX_TIMESTAMP(`StartedAt`)) / 60"
    );
}

#[test]
fn test_unknown_operator_never_fails() {
    for target in Target::all() {
        let dsl = json!({"expr": {"op": "fuzzymatch", "args": [{"ref": "Name"}, {"lit": "smith"}]}});
        let compiled = GuardCompiler::new(*target).compile_guard(&dsl);
        assert!(compiled.starts_with("FUZZYMATCH("), "{target}: {compiled}");
    }
}

#[test]
fn test_compiled_guard_record() {
    let guard = compile_guard_to_sql(&json!("tenant"), "SQLServer");
    assert_eq!(guard.target, "tsql");
    assert!(guard.where_clause.contains("SESSION_CONTEXT(N'TenantId')"));
}

#[test]
fn test_non_document_inputs_deny() {
    assert_eq!(compile_dsl(&json!(null), "tsql"), "0");
    assert_eq!(compile_dsl(&json!(17), "tsql"), "0");
    assert_eq!(compile_dsl(&json!([1, 2, 3]), "postgres"), "FALSE");
}

#[test]
fn test_same_tree_compiles_to_multiple_targets() {
    // One parsed tree, many targets - no shared mutable state.
    let expr = refract::guard::parse_expr(&json!({
        "op": "gte",
        "args": [{"ref": "Amount", "as": "int"}, {"lit": 100}]
    }));
    assert_eq!(
        GuardCompiler::new(Target::TSql).compile(&expr),
        "(CAST([Amount] AS INT) >= 100)"
    );
    assert_eq!(
        GuardCompiler::new(Target::BigQuery).compile(&expr),
        "(CAST(`Amount` AS INT) >= 100)"
    );
    assert_eq!(
        GuardCompiler::new(Target::TSql).compile(&expr),
        "(CAST([Amount] AS INT) >= 100)"
    );
}
