//! Pre-analysis screen: level counts, components, metric charts and the
//! anomaly/correlation lists.

use super::{HealthView, Panel};
use crate::model::{AnalysisResult, MetricsSummary, PreAnalysis};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelCount {
    pub level: String,
    pub count: u64,
    /// Percentage of all counted entries, one decimal.
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesView {
    pub name: &'static str,
    pub unit: &'static str,
    pub values: Vec<f64>,
    pub peak: Option<f64>,
    pub peak_index: Option<usize>,
}

impl SeriesView {
    fn new(name: &'static str, unit: &'static str, values: &[f64]) -> Self {
        let peak = values
            .iter()
            .copied()
            .enumerate()
            .fold(None, |best: Option<(usize, f64)>, (i, v)| match best {
                Some((_, b)) if b >= v => best,
                _ => Some((i, v)),
            });
        Self {
            name,
            unit,
            values: values.to_vec(),
            peak: peak.map(|(_, v)| v),
            peak_index: peak.map(|(i, _)| i),
        }
    }

    pub fn has_data(&self) -> bool {
        !self.values.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Aggregates {
    pub peak_cpu: Option<f64>,
    pub peak_latency: Option<f64>,
    pub avg_cpu: Option<f64>,
    pub avg_memory: Option<f64>,
    pub metric_points: Option<u64>,
    /// Aggregates the dashboard has no dedicated tile for.
    pub other: BTreeMap<String, Value>,
}

impl From<&MetricsSummary> for Aggregates {
    fn from(m: &MetricsSummary) -> Self {
        Self {
            peak_cpu: m.peak_cpu(),
            peak_latency: m.peak_latency(),
            avg_cpu: m.avg_cpu,
            avg_memory: m.avg_memory,
            metric_points: m.metric_points,
            other: m.extra.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreAnalysisView {
    pub available: bool,
    pub health: HealthView,
    pub total_entries: u64,
    pub parsed_entries: Option<u64>,
    pub log_levels: Panel<LevelCount>,
    pub components: Panel<String>,
    pub series: Vec<SeriesView>,
    pub aggregates: Aggregates,
    pub anomalies: Panel<String>,
    pub correlations: Panel<String>,
}

impl PreAnalysisView {
    pub fn build(result: Option<&AnalysisResult>) -> Self {
        let pre = result.and_then(|r| r.pre_analysis.as_ref());
        let empty = PreAnalysis::default();
        let p = pre.unwrap_or(&empty);
        let m = &p.metrics_summary;

        Self {
            available: pre.is_some(),
            health: HealthView::new(p.health()),
            total_entries: p.total_log_entries(),
            parsed_entries: p.parsed_entries,
            log_levels: Panel::new(level_counts(p), "No log levels were counted."),
            components: Panel::new(
                p.distinct_components().into_iter().map(str::to_string).collect(),
                "No components were identified.",
            ),
            series: vec![
                SeriesView::new("cpu", "%", &m.cpu_series),
                SeriesView::new("memory", "MB", &m.memory_series),
                SeriesView::new("latency", "ms", &m.latency_series),
            ],
            aggregates: Aggregates::from(m),
            anomalies: Panel::new(p.anomalies.clone(), "No anomalies detected."),
            correlations: Panel::new(p.correlations.clone(), "No correlations found."),
        }
    }
}

/// Most frequent level first; ties broken by name.
fn level_counts(p: &PreAnalysis) -> Vec<LevelCount> {
    let total = p.total_log_entries();
    let mut levels: Vec<LevelCount> = p
        .log_levels
        .iter()
        .map(|(level, &count)| LevelCount {
            level: level.clone(),
            count,
            share: if total == 0 {
                0.0
            } else {
                (count as f64 * 1000.0 / total as f64).round() / 10.0
            },
        })
        .collect();
    levels.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.level.cmp(&b.level)));
    levels
}
