//! Standalone HTML report of the LLM analysis.
//!
//! Everything interpolated from analysis text goes through askama's HTML
//! escaper, so titles or recommendations containing markup render as text.

use super::{ExportArtifact, ExportError};
use crate::model::{AnalysisResult, LlmAnalysis};
use askama::Template;
use chrono::{DateTime, Utc};
use serde_json::Value;

pub const REPORT_CONTENT_TYPE: &str = "text/html; charset=utf-8";

#[derive(Template)]
#[template(path = "report.html")]
struct ReportTemplate<'a> {
    generated_at: String,
    version: &'static str,
    has_score: bool,
    score: u8,
    health_color: &'static str,
    has_summary: bool,
    summary: &'a str,
    has_metrics: bool,
    metrics: Vec<MetricRow>,
    has_anomalies: bool,
    anomalies: &'a [String],
    is_root_cause: bool,
    root_cause: &'a str,
    immediate_actions: &'a [String],
    short_term_fixes: &'a [String],
    sections: Vec<Section<'a>>,
}

struct MetricRow {
    label: String,
    value: String,
}

struct Section<'a> {
    index: usize,
    title: &'a str,
    severity: &'static str,
    badge_color: &'static str,
    description: &'a str,
    root_cause: &'a str,
    recommendation: &'a str,
    affected_component: &'a str,
}

pub fn report_filename(at: DateTime<Utc>) -> String {
    format!("performance-report-{}.html", at.timestamp_millis())
}

/// Render the report. A result without an LLM analysis still renders, with
/// placeholders in place of the summary and bottleneck list.
pub fn render_report(result: &AnalysisResult, at: DateTime<Utc>) -> Result<ExportArtifact, ExportError> {
    let llm = result.llm_analysis.as_ref();
    let score = llm
        .and_then(LlmAnalysis::overall_health)
        .or_else(|| result.health_score());

    let (root_cause, immediate_actions, short_term_fixes): (&str, &[String], &[String]) = match llm {
        Some(LlmAnalysis::RootCause(r)) => (
            r.root_cause.as_deref().unwrap_or("Not identified."),
            &r.immediate_actions,
            &r.short_term_fixes,
        ),
        _ => ("", &[], &[]),
    };

    let metrics: Vec<MetricRow> = match llm {
        Some(LlmAnalysis::Bottlenecks(r)) => r
            .metrics_summary
            .iter()
            .map(|(key, value)| MetricRow {
                label: humanize(key),
                value: display_value(value),
            })
            .collect(),
        _ => Vec::new(),
    };

    let anomalies: &[String] = result
        .pre_analysis
        .as_ref()
        .map(|p| p.anomalies.as_slice())
        .unwrap_or(&[]);

    let summary = llm.and_then(LlmAnalysis::summary).unwrap_or("");
    let sections = llm
        .map(LlmAnalysis::bottlenecks)
        .unwrap_or(&[])
        .iter()
        .enumerate()
        .map(|(i, b)| Section {
            index: i + 1,
            title: &b.title,
            severity: b.severity.label(),
            badge_color: b.severity.badge_color(),
            description: &b.description,
            root_cause: &b.root_cause,
            recommendation: &b.recommendation,
            affected_component: &b.affected_component,
        })
        .collect();

    let template = ReportTemplate {
        generated_at: at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        version: env!("CARGO_PKG_VERSION"),
        has_score: score.is_some(),
        score: score.unwrap_or_default(),
        health_color: health_color(score),
        has_summary: !summary.trim().is_empty(),
        summary,
        has_metrics: !metrics.is_empty(),
        metrics,
        has_anomalies: !anomalies.is_empty(),
        anomalies,
        is_root_cause: matches!(llm, Some(LlmAnalysis::RootCause(_))),
        root_cause,
        immediate_actions,
        short_term_fixes,
        sections,
    };

    Ok(ExportArtifact {
        filename: report_filename(at),
        content_type: REPORT_CONTENT_TYPE,
        bytes: template.render()?.into_bytes(),
    })
}

fn health_color(score: Option<u8>) -> &'static str {
    match score {
        Some(s) if s < 50 => "#dc2626",
        Some(s) if s < 80 => "#ca8a04",
        Some(_) => "#16a34a",
        None => "#6b7280",
    }
}

/// `db_connections` -> `Db connections`
fn humanize(key: &str) -> String {
    let spaced = key.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}
