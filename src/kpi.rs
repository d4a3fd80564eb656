//! KPI threshold compiler.
//!
//! Composes a compiled metric expression with red/yellow/green threshold
//! bands into a three-way status classification, plus variance
//! expressions when a target value is present. SQL targets get a `CASE`
//! chain, the BI target a `SWITCH(TRUE(), ...)`; the comparison direction
//! inverts for lower-is-better KPIs.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dialect::{DialectFamily, Target};
use crate::metric::CompiledMetric;

/// Whether larger metric values are better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum KpiDirection {
    #[default]
    HigherIsBetter,
    LowerIsBetter,
}

impl KpiDirection {
    /// Lenient parse: the higher-is-better spellings map up, everything
    /// else maps down.
    pub fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "higherbetter" | "higherisbetter" | "maximize" => KpiDirection::HigherIsBetter,
            _ => KpiDirection::LowerIsBetter,
        }
    }
}

/// Result of compiling a KPI definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledKpi {
    pub kpi_code: String,
    pub metric_code: String,
    pub status_expression: String,
    pub variance_expression: Option<String>,
    pub variance_pct_expression: Option<String>,
}

/// Compile a KPI definition into threshold check expressions.
///
/// `metrics` is the lookup of already-compiled metrics; when the KPI's
/// metric is present its expression is inlined, otherwise the status
/// expression references the metric by bracketed code.
pub fn compile_kpi(
    kpi_def: &Value,
    metrics: &HashMap<String, CompiledMetric>,
    target: &str,
) -> CompiledKpi {
    let kpi_code = first_str(kpi_def, &["code", "kpiCode", "KPI_Code"])
        .unwrap_or("Unknown")
        .to_string();
    let metric_code = first_str(kpi_def, &["metricCode", "KPI_MetricCode"])
        .unwrap_or_default()
        .to_string();
    let direction = KpiDirection::parse(
        first_str(kpi_def, &["direction", "KPI_Direction"]).unwrap_or("HigherIsBetter"),
    );
    let thresholds = parse_thresholds(
        kpi_def
            .get("thresholds")
            .or_else(|| kpi_def.get("KPI_ThresholdsJSON")),
    );
    let target_value = kpi_def
        .get("targetValue")
        .or_else(|| kpi_def.get("KPI_TargetValue"))
        .filter(|v| !v.is_null());

    let metric_expr = match metrics.get(&metric_code) {
        Some(compiled) => format!("({})", compiled.expression),
        None => format!("[{metric_code}]"),
    };

    let resolved = Target::parse(target);
    let red = thresholds.get("red").or_else(|| thresholds.get("critical"));
    let yellow = thresholds
        .get("yellow")
        .or_else(|| thresholds.get("warning"));
    let green = thresholds.get("green").or_else(|| thresholds.get("good"));

    let status_expression = if resolved.profile().family == DialectFamily::Bi {
        status_bi(&metric_expr, direction, red, yellow, green)
    } else {
        status_sql(&metric_expr, direction, red, yellow, green)
    };

    let (variance_expression, variance_pct_expression) = match target_value {
        Some(target_value) => {
            let t = threshold_text(target_value);
            (
                Some(format!("({metric_expr} - {t})")),
                Some(format!(
                    "(({metric_expr} - {t}) / NULLIF({t}, 0) * 100)"
                )),
            )
        }
        None => (None, None),
    };

    CompiledKpi {
        kpi_code,
        metric_code,
        status_expression,
        variance_expression,
        variance_pct_expression,
    }
}

/// Thresholds arrive as a JSON object or a JSON-encoded string; anything
/// unreadable is an empty set of bands.
fn parse_thresholds(value: Option<&Value>) -> serde_json::Map<String, Value> {
    match value {
        Some(Value::Object(map)) => map.clone(),
        Some(Value::String(s)) => match serde_json::from_str::<Value>(s) {
            Ok(Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        },
        _ => serde_json::Map::new(),
    }
}

/// Threshold values render bare: numbers as decimal text, strings verbatim.
fn threshold_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn status_sql(
    metric: &str,
    direction: KpiDirection,
    red: Option<&Value>,
    yellow: Option<&Value>,
    green: Option<&Value>,
) -> String {
    let (ge, lt) = match direction {
        KpiDirection::HigherIsBetter => (">=", "<"),
        KpiDirection::LowerIsBetter => ("<=", ">"),
    };

    match (red, yellow) {
        (Some(red), Some(yellow)) => {
            let green = threshold_text(green.unwrap_or(yellow));
            let yellow = threshold_text(yellow);
            let red = threshold_text(red);
            format!(
                "CASE\n    WHEN {metric} {ge} {green} THEN 'Green'\n    WHEN {metric} {ge} {yellow} THEN 'Yellow'\n    WHEN {metric} {lt} {red} THEN 'Red'\n    ELSE 'Yellow'\nEND"
            )
        }
        (Some(red), None) => {
            let red = threshold_text(red);
            format!("CASE WHEN {metric} {ge} {red} THEN 'Green' ELSE 'Red' END")
        }
        _ => "'Unknown'".to_string(),
    }
}

fn status_bi(
    metric: &str,
    direction: KpiDirection,
    red: Option<&Value>,
    yellow: Option<&Value>,
    green: Option<&Value>,
) -> String {
    let (ge, lt) = match direction {
        KpiDirection::HigherIsBetter => (">=", "<"),
        KpiDirection::LowerIsBetter => ("<=", ">"),
    };

    match (red, yellow) {
        (Some(red), Some(yellow)) => {
            let green = threshold_text(green.unwrap_or(yellow));
            let yellow = threshold_text(yellow);
            let red = threshold_text(red);
            format!(
                "\nSWITCH(\n    TRUE(),\n    {metric} {ge} {green}, \"Green\",\n    {metric} {ge} {yellow}, \"Yellow\",\n    {metric} {lt} {red}, \"Red\",\n    \"Yellow\"\n)"
            )
        }
        (Some(red), None) => {
            let red = threshold_text(red);
            format!("IF({metric} {ge} {red}, \"Green\", \"Red\")")
        }
        _ => "\"Unknown\"".to_string(),
    }
}

fn first_str<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| value.get(key).and_then(Value::as_str))
}
