use refract::validation::{validate_guard, validate_metric, ValidationError};
use serde_json::json;

#[test]
fn test_clean_documents_pass() {
    assert!(validate_guard(&json!("tenant")).is_ok());
    assert!(validate_guard(&json!({"expr": {"op": "and", "args": [
        {"op": "eq", "args": [{"ref": "Status"}, {"lit": "Active"}]},
        {"op": "isnotnull", "args": [{"ref": "TenantId"}]}
    ]}}))
    .is_ok());
    assert!(validate_metric(&json!("SUM(Sales.Amount)")).is_ok());
}

#[test]
fn test_validation_never_blocks_compilation() {
    // Validation and compilation are independent: a document that fails
    // validation still compiles to something.
    let dsl = json!({"expr": {"op": "fuzzymatch", "args": [{"ref": "A"}]}});
    assert!(validate_guard(&dsl).is_err());
    let compiled = refract::compile_dsl(&dsl, "tsql");
    assert_eq!(compiled, "FUZZYMATCH([A])");
}

#[test]
fn test_guard_errors_accumulate() {
    let dsl = json!({"expr": {"op": "and", "args": [
        {"op": "levenshtein", "args": [{"ref": "A"}, {"ref": "B"}]},
        {"op": "eq", "args": [{"ref": "OnlyOne"}]},
        {"unknown_shape": true}
    ]}});
    let errors = validate_guard(&dsl).unwrap_err();
    assert_eq!(errors.len(), 3);
    assert!(errors
        .iter()
        .any(|e| matches!(e, ValidationError::UnknownOperator(name) if name == "levenshtein")));
    assert!(errors
        .iter()
        .any(|e| matches!(e, ValidationError::BadArity { found: 1, .. })));
    assert!(errors
        .iter()
        .any(|e| matches!(e, ValidationError::UninterpretableShape(_))));
}

#[test]
fn test_metric_unknown_function_names() {
    let formula = json!({
        "agg": "HARMONICMEAN",
        "arg": {"ref": "Sales.Amount"}
    });
    let errors = validate_metric(&formula).unwrap_err();
    assert_eq!(
        errors,
        vec![ValidationError::UnknownAggregation("HARMONICMEAN".to_string())]
    );
}

#[test]
fn test_metric_nested_documents_are_walked() {
    let formula = json!({
        "divide": [
            {"timeIntel": "NEXTYEAR", "metric": {"metric": "A"}, "dateColumn": {"ref": "D.Day"}},
            {"agg": "sum", "arg": {"ref": "S.Amount"}}
        ]
    });
    let errors = validate_metric(&formula).unwrap_err();
    // Lowercase "sum" is fine; only the bogus time intel is flagged.
    assert_eq!(
        errors,
        vec![ValidationError::UnknownTimeIntel("NEXTYEAR".to_string())]
    );
}

#[test]
fn test_error_messages_are_presentable() {
    let error = ValidationError::UnknownOperator("soundex".to_string());
    assert_eq!(error.to_string(), "unknown guard operator 'soundex'");
}
