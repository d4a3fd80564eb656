use refract::guard::{parse_document, parse_document_str, parse_expr, GuardExpr, GuardOp};
use serde_json::json;

#[test]
fn test_shorthand_documents() {
    assert_eq!(
        parse_document_str("allow").expr,
        Some(GuardExpr::bool(true))
    );
    assert_eq!(parse_document_str("1=1").expr, Some(GuardExpr::bool(true)));
    assert_eq!(parse_document_str("deny").expr, Some(GuardExpr::bool(false)));
    assert_eq!(
        parse_document_str("tenant").expr,
        Some(GuardExpr::tenant_guard())
    );
}

#[test]
fn test_json_string_document() {
    let doc = parse_document_str(r#"{"expr": {"op": "isnull", "args": [{"ref": "DeletedAt"}]}}"#);
    assert_eq!(
        doc.expr,
        Some(GuardExpr::op(
            GuardOp::IsNull,
            vec![GuardExpr::reference("DeletedAt")]
        ))
    );
}

#[test]
fn test_unparseable_string_is_deny() {
    assert_eq!(
        parse_document_str("not a guard").expr,
        Some(GuardExpr::bool(false))
    );
}

#[test]
fn test_envelope_defaults() {
    let doc = parse_document(&json!({"expr": true}));
    assert_eq!(doc.kind, "Guard");
    assert_eq!(doc.version, 1);
    assert!(doc.description.is_none());
    assert!(doc.params.is_none());
}

#[test]
fn test_envelope_fields_carried() {
    let doc = parse_document(&json!({
        "kind": "RowFilter",
        "version": 3,
        "description": "active rows only",
        "params": {"region": "west"},
        "expr": {"op": "eq", "args": [{"ref": "Status"}, {"lit": "Active"}]}
    }));
    assert_eq!(doc.kind, "RowFilter");
    assert_eq!(doc.version, 3);
    assert_eq!(doc.params, Some(json!({"region": "west"})));
    assert!(doc.expr.is_some());
}

#[test]
fn test_nested_op_parsing() {
    let expr = parse_expr(&json!({
        "op": "and",
        "args": [
            {"op": "eq", "args": [{"ref": "Status"}, {"lit": "Active"}]},
            {"op": "not", "args": [{"op": "isnull", "args": [{"ref": "TenantId"}]}]}
        ]
    }));
    match expr {
        GuardExpr::Op { op: GuardOp::And, args } => {
            assert_eq!(args.len(), 2);
            assert!(matches!(&args[1], GuardExpr::Op { op: GuardOp::Not, .. }));
        }
        other => panic!("expected AND, got {other:?}"),
    }
}

#[test]
fn test_same_tree_from_repeated_parses() {
    // Structural identity: parsing twice yields identical trees.
    let doc = json!({"op": "in", "args": [{"ref": "Type"}, {"lit": "A"}, {"lit": "B"}]});
    assert_eq!(parse_expr(&doc), parse_expr(&doc));
}
