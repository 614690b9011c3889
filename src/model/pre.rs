//! Deterministic "sensing" stage output.

use super::{clamp_score, lenient, lenient_map, lenient_score, lenient_seq};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Statistics the backend computed before the LLM stage ran.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreAnalysis {
    /// 0-100, lower is worse. Kept raw; use [`PreAnalysis::health`] to read.
    #[serde(
        default,
        deserialize_with = "lenient_score",
        skip_serializing_if = "Option::is_none"
    )]
    pub health_score: Option<i64>,

    #[serde(default, deserialize_with = "lenient_map")]
    pub log_levels: BTreeMap<String, u64>,

    #[serde(default, deserialize_with = "lenient_seq")]
    pub components: Vec<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub metrics_summary: MetricsSummary,

    #[serde(default, deserialize_with = "lenient_seq")]
    pub anomalies: Vec<String>,

    #[serde(default, deserialize_with = "lenient_seq")]
    pub correlations: Vec<String>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub parsed_entries: Option<u64>,

    /// Counters such as `anomalies_detected` that are passed through untouched.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl PreAnalysis {
    pub fn health(&self) -> Option<u8> {
        self.health_score.map(clamp_score)
    }

    /// Component names in first-seen order with duplicates removed.
    pub fn distinct_components(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for c in &self.components {
            let c = c.trim();
            if !c.is_empty() && !seen.contains(&c) {
                seen.push(c);
            }
        }
        seen
    }

    pub fn total_log_entries(&self) -> u64 {
        self.log_levels.values().sum()
    }
}

/// Metric time series plus the scalar aggregates derived from them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    #[serde(default, deserialize_with = "lenient_seq")]
    pub cpu_series: Vec<f64>,

    #[serde(default, deserialize_with = "lenient_seq")]
    pub memory_series: Vec<f64>,

    #[serde(default, deserialize_with = "lenient_seq")]
    pub latency_series: Vec<f64>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub max_cpu: Option<f64>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub max_latency: Option<f64>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub avg_cpu: Option<f64>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub avg_memory: Option<f64>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub metric_points: Option<u64>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl MetricsSummary {
    pub fn is_empty(&self) -> bool {
        self.cpu_series.is_empty()
            && self.memory_series.is_empty()
            && self.latency_series.is_empty()
            && self.max_cpu.is_none()
            && self.max_latency.is_none()
            && self.avg_cpu.is_none()
            && self.avg_memory.is_none()
    }

    /// Reported peak CPU, or the series maximum when the aggregate is missing.
    pub fn peak_cpu(&self) -> Option<f64> {
        self.max_cpu.or_else(|| series_max(&self.cpu_series))
    }

    /// Reported peak latency, or the series maximum when the aggregate is missing.
    pub fn peak_latency(&self) -> Option<f64> {
        self.max_latency.or_else(|| series_max(&self.latency_series))
    }
}

fn series_max(series: &[f64]) -> Option<f64> {
    series.iter().copied().fold(None, |acc, v| match acc {
        Some(m) if m >= v => Some(m),
        _ => Some(v),
    })
}
