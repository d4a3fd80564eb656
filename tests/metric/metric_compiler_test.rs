use refract::dialect::{DialectFamily, Target};
use refract::metric::{compile_metric, parse_formula, MetricCompiler, MetricExpr};
use serde_json::json;
use std::collections::HashMap;

fn compile(target: Target, formula: serde_json::Value) -> String {
    MetricCompiler::new(target).compile(&parse_formula(&formula))
}

#[test]
fn test_sum_across_targets() {
    let formula = json!("SUM(Sales.Amount)");
    assert_eq!(
        compile(Target::TSql, formula.clone()),
        "SUM([Sales].[Amount])"
    );
    assert_eq!(
        compile(Target::Postgres, formula.clone()),
        "SUM(\"Sales\".\"Amount\")"
    );
    assert_eq!(
        compile(Target::Spark, formula.clone()),
        "SUM(`Sales`.`Amount`)"
    );
    assert_eq!(compile(Target::Dax, formula.clone()), "SUM(Sales[Amount])");
    assert_eq!(
        compile(Target::Python, formula),
        "df[Sales.Amount].sum()"
    );
}

#[test]
fn test_ytd_wrapper_dax_uses_totalytd() {
    let formula = json!({
        "timeIntel": "YTD",
        "metric": "SUM(Sales.Amount)",
        "dateColumn": {"ref": "Date.Day"}
    });
    let compiled = compile(Target::Dax, formula);
    assert!(compiled.contains("TOTALYTD("), "{compiled}");
    assert_eq!(compiled, "TOTALYTD(SUM(Sales[Amount]), Date[Day])");
}

#[test]
fn test_ytd_sql_synthesis_pins_exact_text() {
    let formula = json!({
        "timeIntel": "YTD",
        "metric": "SUM(Sales.Amount)",
        "dateColumn": {"ref": "Date.Day"}
    });
    assert_eq!(
        compile(Target::TSql, formula.clone()),
        "SUM(CASE WHEN [Date].[Day] >= DATEFROMPARTS(YEAR([Date].[Day]), 1, 1)\n                AND [Date].[Day] <= GETDATE() THEN SUM([Sales].[Amount]) ELSE 0 END)"
    );
    assert_eq!(
        compile(Target::Spark, formula),
        "SUM(CASE WHEN `Date`.`Day` >= DATE_TRUNC('YEAR', CURRENT_DATE())\n                AND `Date`.`Day` <= CURRENT_DATE() THEN SUM(`Sales`.`Amount`) ELSE 0 END)"
    );
}

#[test]
fn test_divide_is_always_guarded() {
    // The zero case is guarded in every target; bare division safety is
    // a per-dialect property, never a function of the expression.
    let formula = json!({"divide": [{"lit": 10}, {"lit": 0}, {"lit": -1}]});
    for target in Target::all() {
        let compiled = compile(*target, formula.clone());
        let profile = target.profile();
        match profile.family {
            DialectFamily::Bi => {
                assert!(compiled.starts_with("DIVIDE("), "{target}: {compiled}")
            }
            DialectFamily::Host => {
                assert!(compiled.contains("!= 0 else"), "{target}: {compiled}")
            }
            DialectFamily::Sql => {
                if profile.null_safe_divide {
                    assert!(
                        compiled.starts_with("CASE WHEN") && compiled.contains("= 0 THEN"),
                        "{target}: {compiled}"
                    );
                } else {
                    assert!(compiled.contains("NULLIF("), "{target}: {compiled}");
                }
            }
        }
    }
}

#[test]
fn test_divide_exact_forms() {
    let formula = json!({"divide": [{"metric": "Profit"}, {"metric": "Revenue"}]});
    assert_eq!(
        compile(Target::TSql, formula.clone()),
        "CASE WHEN /* Revenue */ = 0 THEN 0 ELSE /* Profit */ / /* Revenue */ END"
    );
    assert_eq!(
        compile(Target::Snowflake, formula.clone()),
        "(/* Profit */ / NULLIF(/* Revenue */, 0))"
    );
    assert_eq!(
        compile(Target::Dax, formula),
        "DIVIDE([Profit], [Revenue], 0)"
    );
}

#[test]
fn test_metric_ref_placeholder_policy() {
    // Unresolved references never fail; each family has its placeholder.
    let formula = json!({"metric": "NetRevenue"});
    assert_eq!(compile(Target::TSql, formula.clone()), "/* NetRevenue */");
    assert_eq!(compile(Target::Python, formula.clone()), "/* NetRevenue */");
    assert_eq!(compile(Target::Dax, formula), "[NetRevenue]");
}

#[test]
fn test_metric_ref_resolved_is_parenthesized() {
    let mut lookup = HashMap::new();
    lookup.insert(
        "NetRevenue".to_string(),
        "SUM([Sales].[Amount]) - SUM([Sales].[Refunds])".to_string(),
    );
    let compiler = MetricCompiler::with_metrics(Target::TSql, lookup);
    assert_eq!(
        compiler.compile(&MetricExpr::metric("NetRevenue")),
        "(SUM([Sales].[Amount]) - SUM([Sales].[Refunds]))"
    );
}

#[test]
fn test_arithmetic_combination() {
    let formula = json!({
        "op": "*",
        "left": {"divide": [{"metric": "Profit"}, {"metric": "Revenue"}]},
        "right": {"lit": 100}
    });
    assert_eq!(
        compile(Target::Postgres, formula),
        "((/* Profit */ / NULLIF(/* Revenue */, 0)) * 100)"
    );
}

#[test]
fn test_window_over_clauses() {
    let base = json!({
        "window": "SUM",
        "metric": "SUM(Sales.Amount)",
        "partitionBy": [{"ref": "Sales.Region"}]
    });
    assert_eq!(
        compile(Target::Postgres, base),
        "SUM(SUM(\"Sales\".\"Amount\")) OVER (PARTITION BY \"Sales\".\"Region\")"
    );

    let no_clauses = json!({"window": "RANK", "metric": "SUM(Sales.Amount)"});
    assert_eq!(
        compile(Target::TSql, no_clauses.clone()),
        "RANK(SUM([Sales].[Amount])) OVER ()"
    );
    // BI target renders the inner metric only.
    assert_eq!(compile(Target::Dax, no_clauses), "SUM(Sales[Amount])");
}

#[test]
fn test_filtered_aggregation_sql_conditional_sum() {
    let formula = json!({
        "agg": "SUM",
        "arg": {"ref": "Sales.Amount"},
        "filter": {"op": "=", "left": {"ref": "Sales.Region"}, "right": {"lit": "West"}}
    });
    assert_eq!(
        compile(Target::Snowflake, formula.clone()),
        "SUM(CASE WHEN (\"Sales\".\"Region\" = 'West') THEN \"Sales\".\"Amount\" ELSE 0 END)"
    );
    assert_eq!(
        compile(Target::Dax, formula),
        "CALCULATE(SUM(Sales[Amount]), (Sales[Region] = \"West\"))"
    );
}

#[test]
fn test_compiled_metric_bundles_dependencies() {
    let def = json!({
        "code": "Margin",
        "formula": {
            "divide": [
                {"op": "-", "args": [{"metric": "Revenue"}, {"metric": "Cost"}]},
                {"metric": "Revenue"}
            ]
        }
    });
    let compiled = compile_metric(&def, "postgres", None);
    assert_eq!(compiled.metric_code, "Margin");
    assert_eq!(compiled.target, "postgres");
    assert_eq!(compiled.dependencies, vec!["Cost", "Revenue"]);
    assert_eq!(
        compiled.expression,
        "((/* Revenue */ - /* Cost */) / NULLIF(/* Revenue */, 0))"
    );
}

#[test]
fn test_caller_ordered_two_stage_compilation() {
    // The resolver reports dependencies; the caller orders compilation
    // and feeds earlier results through the lookup.
    let revenue_def = json!({"code": "Revenue", "formula": "SUM(Sales.Amount)"});
    let revenue = compile_metric(&revenue_def, "tsql", None);
    assert!(revenue.dependencies.is_empty());

    let mut lookup = HashMap::new();
    lookup.insert(revenue.metric_code.clone(), revenue.expression.clone());

    let share_def = json!({
        "code": "RevenueShare",
        "formula": {"divide": [{"metric": "Revenue"}, {"lit": 1000000}]}
    });
    let share = compile_metric(&share_def, "tsql", Some(&lookup));
    assert_eq!(share.dependencies, vec!["Revenue"]);
    assert_eq!(
        share.expression,
        "CASE WHEN 1000000 = 0 THEN 0 ELSE (SUM([Sales].[Amount])) / 1000000 END"
    );
}

#[test]
fn test_same_tree_many_targets() {
    let expr = parse_formula(&json!("DISTINCTCOUNT(Orders.CustomerId)"));
    let outputs: Vec<String> = Target::all()
        .iter()
        .map(|t| MetricCompiler::new(*t).compile(&expr))
        .collect();
    assert_eq!(outputs[0], "COUNT(DISTINCT [Orders].[CustomerId])");
    // Re-compiling for the first target still matches - nothing mutated.
    assert_eq!(
        MetricCompiler::new(Target::TSql).compile(&expr),
        outputs[0]
    );
}

#[test]
fn test_golden_snapshots() {
    insta::assert_snapshot!(
        compile(Target::TSql, json!("SUM(Sales.Amount)")),
        @"SUM([Sales].[Amount])"
    );
    insta::assert_snapshot!(
        compile(Target::Dax, json!({
            "timeIntel": "PY",
            "metric": "SUM(Sales.Amount)",
            "dateColumn": {"ref": "Date.Day"}
        })),
        @"CALCULATE(SUM(Sales[Amount]), SAMEPERIODLASTYEAR(Date[Day]))"
    );
    insta::assert_snapshot!(
        compile(Target::Python, json!({
            "coalesce": [{"metric": "A"}, {"lit": 0}]
        })),
        @"next((x for x in [/* A */, 0] if x is not None), None)"
    );
}
