//! LLM "reasoning" stage output.
//!
//! Two shapes are in circulation: a report with a `bottlenecks` list, and a
//! flat single-root-cause record. The shape is picked at decode time by the
//! presence of a `bottlenecks` field.

use super::{canonicalize, clamp_score, lenient, lenient_map, lenient_score, lenient_seq, Severity};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LlmAnalysis {
    Bottlenecks(BottleneckReport),
    RootCause(RootCauseReport),
}

impl<'de> Deserialize<'de> for LlmAnalysis {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = canonicalize(Value::deserialize(deserializer)?);
        if value.get("bottlenecks").is_some() {
            serde_json::from_value(value)
                .map(LlmAnalysis::Bottlenecks)
                .map_err(D::Error::custom)
        } else {
            serde_json::from_value(value)
                .map(LlmAnalysis::RootCause)
                .map_err(D::Error::custom)
        }
    }
}

impl LlmAnalysis {
    pub fn summary(&self) -> Option<&str> {
        match self {
            LlmAnalysis::Bottlenecks(r) => r.summary.as_deref(),
            LlmAnalysis::RootCause(r) => r.summary.as_deref(),
        }
    }

    pub fn overall_health_score(&self) -> Option<i64> {
        match self {
            LlmAnalysis::Bottlenecks(r) => r.overall_health_score,
            LlmAnalysis::RootCause(r) => r.overall_health_score,
        }
    }

    pub fn overall_health(&self) -> Option<u8> {
        self.overall_health_score().map(clamp_score)
    }

    /// Bottleneck records; empty for the root-cause shape.
    pub fn bottlenecks(&self) -> &[Bottleneck] {
        match self {
            LlmAnalysis::Bottlenecks(r) => &r.bottlenecks,
            LlmAnalysis::RootCause(_) => &[],
        }
    }

    pub fn shape(&self) -> &'static str {
        match self {
            LlmAnalysis::Bottlenecks(_) => "bottlenecks",
            LlmAnalysis::RootCause(_) => "root_cause",
        }
    }
}

/// Report listing individual bottlenecks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BottleneckReport {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient_score",
        skip_serializing_if = "Option::is_none"
    )]
    pub overall_health_score: Option<i64>,

    #[serde(default, deserialize_with = "lenient_seq")]
    pub bottlenecks: Vec<Bottleneck>,

    /// The LLM's own headline figures (`cpu_peak`, `memory_peak`, `db_connections`).
    #[serde(
        default,
        deserialize_with = "lenient_map",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub metrics_summary: BTreeMap<String, Value>,
}

/// One identified performance issue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bottleneck {
    #[serde(default, deserialize_with = "lenient")]
    pub title: String,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default, deserialize_with = "lenient")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient")]
    pub root_cause: String,
    /// May contain newlines and command snippets.
    #[serde(default, deserialize_with = "lenient")]
    pub recommendation: String,
    #[serde(default, deserialize_with = "lenient")]
    pub affected_component: String,
}

/// Flat single-root-cause report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RootCauseReport {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub root_cause: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient_score",
        skip_serializing_if = "Option::is_none"
    )]
    pub overall_health_score: Option<i64>,

    #[serde(default, deserialize_with = "lenient_seq")]
    pub immediate_actions: Vec<String>,

    #[serde(default, deserialize_with = "lenient_seq")]
    pub short_term_fixes: Vec<String>,
}
