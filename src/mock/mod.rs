//! Synthetic telemetry for running the dashboard without an analysis backend.
//!
//! [`generate_analysis`] produces a complete result directly; [`raw_logs`]
//! produces log text to push through the normal request path instead.

pub mod raw_logs;

pub use raw_logs::generate_raw_logs;

use crate::model::{
    AnalysisResult, Bottleneck, BottleneckReport, LlmAnalysis, MetricsSummary, PreAnalysis,
    Severity,
};
use rand::Rng;
use serde_json::json;
use std::collections::BTreeMap;

/// Points per synthetic series (one per hour of a day).
pub const SERIES_LEN: usize = 24;
/// Index of the injected spike.
pub const SPIKE_INDEX: usize = 20;

/// Build a degraded-looking but schema-valid analysis result.
pub fn generate_analysis() -> AnalysisResult {
    let mut rng = rand::thread_rng();

    let mut cpu_series: Vec<f64> = (0..SERIES_LEN)
        .map(|i| (30.0 + i as f64 * 1.5 + rng.gen_range(-5.0..5.0)).round())
        .collect();
    let mut memory_series: Vec<f64> = (0..SERIES_LEN)
        .map(|i| (2048.0 + i as f64 * 40.0 + rng.gen_range(0.0..120.0)).round())
        .collect();
    let mut latency_series: Vec<f64> = (0..SERIES_LEN)
        .map(|_| rng.gen_range(120.0..450.0_f64).round())
        .collect();

    let cpu_spike = rng.gen_range(92.0..99.0_f64).round();
    let latency_spike = rng.gen_range(3200.0..4800.0_f64).round();
    cpu_series[SPIKE_INDEX] = cpu_spike;
    memory_series[SPIKE_INDEX] += 1536.0;
    latency_series[SPIKE_INDEX] = latency_spike;

    let avg_cpu = mean(&cpu_series);
    let avg_memory = mean(&memory_series);
    let memory_peak = memory_series.iter().copied().fold(0.0, f64::max);

    let health_score: i64 = rng.gen_range(28..46);
    let error_count: u64 = rng.gen_range(40..90);
    let critical_count: u64 = rng.gen_range(3..9);

    let mut log_levels: BTreeMap<String, u64> = BTreeMap::new();
    log_levels.insert("INFO".to_string(), rng.gen_range(900..1400));
    log_levels.insert("WARN".to_string(), rng.gen_range(120..220));
    log_levels.insert("ERROR".to_string(), error_count);
    log_levels.insert("CRITICAL".to_string(), critical_count);
    let parsed_entries: u64 = log_levels.values().sum();

    let pre_analysis = PreAnalysis {
        health_score: Some(health_score),
        log_levels,
        components: vec![
            "API Gateway".into(),
            "OrderService".into(),
            "PostgreSQL".into(),
            "Redis Cache".into(),
            "JVM Runtime".into(),
        ],
        metrics_summary: MetricsSummary {
            max_cpu: Some(cpu_spike),
            max_latency: Some(latency_spike),
            avg_cpu: Some(avg_cpu),
            avg_memory: Some(avg_memory),
            metric_points: Some(SERIES_LEN as u64),
            cpu_series,
            memory_series,
            latency_series,
            extra: BTreeMap::new(),
        },
        anomalies: vec![
            format!("Critical CPU Spike detected: {}%", cpu_spike),
            format!("High Latency detected: {}ms", latency_spike),
            "Database connection pool exhausted (50/50 active connections)".into(),
            format!("{} ERROR entries clustered around the spike window", error_count),
        ],
        correlations: vec![
            "Strong correlation: Database Errors are likely causing Latency spikes.".into(),
            "CPU saturation coincides with stop-the-world GC pauses in JVM Runtime.".into(),
        ],
        parsed_entries: Some(parsed_entries),
        extra: BTreeMap::new(),
    };

    let llm_analysis = LlmAnalysis::Bottlenecks(BottleneckReport {
        summary: Some(format!(
            "The system is degraded (health {}/100). A CPU spike to {}% at hour {} coincided \
             with {}ms request latency, driven by database connection pool exhaustion and \
             long garbage-collection pauses.",
            health_score, cpu_spike, SPIKE_INDEX, latency_spike
        )),
        overall_health_score: Some(health_score),
        bottlenecks: vec![
            Bottleneck {
                title: "Database connection pool exhaustion".into(),
                severity: Severity::Critical,
                description: "All 50 pooled connections were held during the spike window; \
                              requests queued until ConnectionTimeoutException."
                    .into(),
                root_cause: "Connections leaked by OrderService on the error path are never \
                             returned to the pool."
                    .into(),
                recommendation: "Close connections in a finally block and cap pool wait time:\n\
                                 spring.datasource.hikari.maximum-pool-size=80\n\
                                 spring.datasource.hikari.leak-detection-threshold=2000"
                    .into(),
                affected_component: "Database".into(),
            },
            Bottleneck {
                title: "Stop-the-world GC pauses".into(),
                severity: Severity::High,
                description: "Full GC cycles exceeding 1200ms stall request threads.".into(),
                root_cause: "Heap sized too small for the peak working set.".into(),
                recommendation: "Switch to G1 and raise the heap:\n-XX:+UseG1GC -Xmx4g".into(),
                affected_component: "Infrastructure".into(),
            },
            Bottleneck {
                title: "Uncached product lookups".into(),
                severity: Severity::Medium,
                description: "Hot product queries bypass Redis and hit PostgreSQL directly."
                    .into(),
                root_cause: "Cache keys include a per-request timestamp.".into(),
                recommendation: "Drop the timestamp from cache keys and set a 60s TTL.".into(),
                affected_component: "Code".into(),
            },
        ],
        metrics_summary: BTreeMap::from([
            ("cpu_peak".to_string(), json!(format!("{}%", cpu_spike))),
            ("memory_peak".to_string(), json!(format!("{} MB", memory_peak))),
            ("db_connections".to_string(), json!("50/50")),
        ]),
    });

    AnalysisResult {
        pre_analysis: Some(pre_analysis),
        llm_analysis: Some(llm_analysis),
        files: Vec::new(),
    }
}

fn mean(series: &[f64]) -> f64 {
    if series.is_empty() {
        return 0.0;
    }
    let avg = series.iter().sum::<f64>() / series.len() as f64;
    (avg * 100.0).round() / 100.0
}
