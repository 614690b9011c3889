//! LLM insights screen: executive summary, bottleneck cards or the flat
//! root-cause record, depending on which shape the service produced.

use super::{HealthView, Panel};
use crate::model::{AnalysisResult, Bottleneck, LlmAnalysis, Severity};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BottleneckCard {
    pub index: usize,
    pub title: String,
    pub severity: &'static str,
    pub badge: &'static str,
    pub description: String,
    pub root_cause: String,
    /// Recommendation split on newlines, blank lines dropped.
    pub recommendation_lines: Vec<String>,
    pub affected_component: String,
}

impl BottleneckCard {
    fn new(index: usize, b: &Bottleneck) -> Self {
        Self {
            index,
            title: or_placeholder(&b.title, "Untitled bottleneck"),
            severity: b.severity.label(),
            badge: b.severity.badge_class(),
            description: b.description.clone(),
            root_cause: b.root_cause.clone(),
            recommendation_lines: b
                .recommendation
                .lines()
                .map(str::trim_end)
                .filter(|l| !l.trim().is_empty())
                .map(str::to_string)
                .collect(),
            affected_component: or_placeholder(&b.affected_component, "Unspecified"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RootCauseView {
    pub root_cause: Option<String>,
    pub immediate_actions: Panel<String>,
    pub short_term_fixes: Panel<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeverityCount {
    pub severity: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricEntry {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightsView {
    pub available: bool,
    pub shape: Option<&'static str>,
    pub summary: Option<String>,
    pub health: HealthView,
    pub bottlenecks: Panel<BottleneckCard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_cause: Option<RootCauseView>,
    /// Non-zero counts only, most severe first.
    pub severity_counts: Vec<SeverityCount>,
    pub metrics: Vec<MetricEntry>,
}

impl InsightsView {
    pub fn build(result: Option<&AnalysisResult>) -> Self {
        let llm = result.and_then(|r| r.llm_analysis.as_ref());

        let cards: Vec<BottleneckCard> = llm
            .map(LlmAnalysis::bottlenecks)
            .unwrap_or(&[])
            .iter()
            .enumerate()
            .map(|(i, b)| BottleneckCard::new(i + 1, b))
            .collect();

        let root_cause = match llm {
            Some(LlmAnalysis::RootCause(r)) => Some(RootCauseView {
                root_cause: r.root_cause.clone().filter(|s| !s.trim().is_empty()),
                immediate_actions: Panel::new(r.immediate_actions.clone(), "No immediate actions."),
                short_term_fixes: Panel::new(r.short_term_fixes.clone(), "No short-term fixes."),
            }),
            _ => None,
        };

        let metrics = match llm {
            Some(LlmAnalysis::Bottlenecks(r)) => r
                .metrics_summary
                .iter()
                .map(|(key, value)| MetricEntry {
                    key: key.clone(),
                    value: match value {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    },
                })
                .collect(),
            _ => Vec::new(),
        };

        Self {
            available: llm.is_some(),
            shape: llm.map(LlmAnalysis::shape),
            summary: llm
                .and_then(LlmAnalysis::summary)
                .filter(|s| !s.trim().is_empty())
                .map(str::to_string),
            health: HealthView::new(llm.and_then(LlmAnalysis::overall_health)),
            severity_counts: severity_counts(llm.map(LlmAnalysis::bottlenecks).unwrap_or(&[])),
            bottlenecks: Panel::new(cards, "No bottlenecks were identified."),
            root_cause,
            metrics,
        }
    }
}

fn severity_counts(bottlenecks: &[Bottleneck]) -> Vec<SeverityCount> {
    let buckets = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
        Severity::Other(String::new()),
    ];
    buckets
        .iter()
        .map(|bucket| SeverityCount {
            severity: bucket.label(),
            count: bottlenecks
                .iter()
                .filter(|b| b.severity.rank() == bucket.rank())
                .count(),
        })
        .filter(|c| c.count > 0)
        .collect()
}

fn or_placeholder(value: &str, placeholder: &str) -> String {
    if value.trim().is_empty() {
        placeholder.to_string()
    } else {
        value.to_string()
    }
}
