//! Analysis result schema shared with the external analysis backend.
//!
//! The backend emits snake_case keys; the dashboard views historically named
//! the same fields in camelCase. Keys are rewritten to snake_case before each
//! object is decoded, and where both spellings are present the snake_case one
//! wins. Encoding is always snake_case. Decoding is lenient: a field with the
//! wrong JSON type decodes as absent instead of failing the whole result.

pub mod llm;
pub mod pre;
pub mod severity;

pub use llm::{Bottleneck, BottleneckReport, LlmAnalysis, RootCauseReport};
pub use pre::{MetricsSummary, PreAnalysis};
pub use severity::Severity;

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Top-level payload returned by `/api/analyze` and `/api/analyze-multi`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalysisResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre_analysis: Option<PreAnalysis>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm_analysis: Option<LlmAnalysis>,

    /// Per-file summaries, only present on multi-file uploads.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<FileSummary>,
}

impl<'de> Deserialize<'de> for AnalysisResult {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut entries = match Value::deserialize(deserializer)? {
            Value::Object(entries) => canonical_keys(entries),
            _ => return Err(D::Error::custom("expected a JSON object")),
        };
        Ok(AnalysisResult {
            pre_analysis: entries.remove("pre_analysis").map(decode_lenient).unwrap_or_default(),
            llm_analysis: entries.remove("llm_analysis").map(decode_lenient).unwrap_or_default(),
            files: entries.remove("files").map(decode_lenient_seq).unwrap_or_default(),
        })
    }
}

impl AnalysisResult {
    /// Decode a backend response body.
    pub fn from_json(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }

    /// Clamped health score from the pre-analysis stage, falling back to the
    /// LLM's overall score.
    pub fn health_score(&self) -> Option<u8> {
        self.pre_analysis
            .as_ref()
            .and_then(PreAnalysis::health)
            .or_else(|| self.llm_analysis.as_ref().and_then(LlmAnalysis::overall_health))
    }

    /// Schema problems that consumers would have to absorb as degraded
    /// rendering. Empty for a well-formed result.
    pub fn schema_violations(&self) -> Vec<String> {
        let mut problems = Vec::new();

        match &self.pre_analysis {
            None => problems.push("pre_analysis is missing".to_string()),
            Some(pre) => {
                if let Some(score) = pre.health_score {
                    if !(0..=100).contains(&score) {
                        problems.push(format!("health_score {} is outside 0-100", score));
                    }
                }
                let metrics = &pre.metrics_summary;
                for (name, series) in [
                    ("cpu_series", &metrics.cpu_series),
                    ("memory_series", &metrics.memory_series),
                    ("latency_series", &metrics.latency_series),
                ] {
                    if series.iter().any(|v| *v < 0.0) {
                        problems.push(format!("{} contains negative values", name));
                    }
                }
                if pre.anomalies.iter().any(|a| a.trim().is_empty()) {
                    problems.push("anomalies contains an empty description".to_string());
                }
            }
        }

        match &self.llm_analysis {
            None => problems.push("llm_analysis is missing".to_string()),
            Some(llm) => {
                if let Some(score) = llm.overall_health_score() {
                    if !(0..=100).contains(&score) {
                        problems.push(format!("overall_health_score {} is outside 0-100", score));
                    }
                }
                if matches!(llm.summary(), Some(s) if s.trim().is_empty()) {
                    problems.push("summary is present but empty".to_string());
                }
                for b in llm.bottlenecks() {
                    if !b.severity.is_canonical() {
                        problems.push(format!("bottleneck '{}' has unknown severity", b.title));
                    }
                }
            }
        }

        problems
    }
}

/// What the multi-file endpoint reports about each uploaded file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileSummary {
    #[serde(default, deserialize_with = "lenient")]
    pub filename: String,
    /// `csv`, `json` or `log`.
    #[serde(rename = "type", default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub rows: Option<u64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub bytes: Option<u64>,
    /// Set to `failed_read` when the backend could not read the file.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Clamp a raw score into 0..=100.
pub fn clamp_score(raw: i64) -> u8 {
    raw.clamp(0, 100) as u8
}

// ---------------------------------------------------------------------------
// Key canonicalisation
// ---------------------------------------------------------------------------

/// Legacy spellings that do not snake-case to the field name.
const LEGACY_KEYS: &[(&str, &str)] = &[("log_level_counts", "log_levels")];

/// Rewrite the keys of one object to their snake_case field names.
///
/// Keys that are already canonical take precedence; a renamed key that
/// collides with one is dropped. Nested objects are left alone, each one is
/// canonicalised when its own field is decoded.
fn canonical_keys(entries: Map<String, Value>) -> Map<String, Value> {
    let mut canonical = Map::with_capacity(entries.len());
    let mut renamed = Vec::new();
    for (key, value) in entries {
        let name = canonical_key(&key);
        if name == key {
            canonical.insert(key, value);
        } else {
            renamed.push((name, value));
        }
    }
    for (name, value) in renamed {
        canonical.entry(name).or_insert(value);
    }
    canonical
}

fn canonical_key(key: &str) -> String {
    let snake = if has_camel_hump(key) {
        snake_case(key)
    } else {
        key.to_string()
    };
    match LEGACY_KEYS.iter().find(|(legacy, _)| *legacy == snake) {
        Some((_, name)) => name.to_string(),
        None => snake,
    }
}

fn starts_word(prev: u8) -> bool {
    prev.is_ascii_lowercase() || prev.is_ascii_digit()
}

// `INFO` and `Database` stay as they are.
fn has_camel_hump(key: &str) -> bool {
    key.as_bytes()
        .windows(2)
        .any(|w| starts_word(w[0]) && w[1].is_ascii_uppercase())
}

fn snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    let mut prev: Option<u8> = None;
    for b in key.bytes() {
        if b.is_ascii_uppercase() && prev.is_some_and(starts_word) {
            out.push('_');
        }
        out.push(b.to_ascii_lowercase() as char);
        prev = Some(b);
    }
    out
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(entries) => Value::Object(canonical_keys(entries)),
        other => other,
    }
}

// ---------------------------------------------------------------------------
// Lenient field decoders
// ---------------------------------------------------------------------------

fn decode_lenient<T: DeserializeOwned + Default>(value: Value) -> T {
    serde_json::from_value(canonicalize(value)).unwrap_or_default()
}

fn decode_lenient_seq<T: DeserializeOwned>(value: Value) -> Vec<T> {
    let items = match value {
        Value::Array(items) => items,
        _ => return Vec::new(),
    };
    items
        .into_iter()
        .filter_map(|item| serde_json::from_value(canonicalize(item)).ok())
        .collect()
}

/// Decode `T`, or fall back to `T::default()` when the JSON has the wrong shape.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(decode_lenient(Value::deserialize(deserializer)?))
}

/// Decode an array, keeping only the elements that have the right shape.
pub(crate) fn lenient_seq<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(decode_lenient_seq(Value::deserialize(deserializer)?))
}

/// Decode a string-keyed map, keeping only the values that have the right shape.
pub(crate) fn lenient_map<'de, D, T>(deserializer: D) -> Result<BTreeMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let entries = match Value::deserialize(deserializer)? {
        Value::Object(entries) => entries,
        _ => return Ok(BTreeMap::new()),
    };
    Ok(entries
        .into_iter()
        .filter_map(|(k, v)| serde_json::from_value(v).ok().map(|v| (k, v)))
        .collect())
}

/// Scores arrive as integers, floats, or not at all.
pub(crate) fn lenient_score<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let score = match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64)),
        _ => None,
    };
    Ok(score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decodes_backend_snake_case_payload() {
        let body = json!({
            "pre_analysis": {
                "parsed_entries": 5,
                "log_levels": {"INFO": 1, "ERROR": 1, "CRITICAL": 1, "METRICS": 2},
                "components": ["System"],
                "metrics_summary": {
                    "avg_cpu": 50.5, "max_cpu": 89, "avg_memory": 737.0,
                    "max_latency": 1200, "metric_points": 2,
                    "cpu_series": [12, 89], "memory_series": [450, 1024], "latency_series": [1200]
                },
                "anomalies_detected": 1,
                "correlations_found": 0,
                "health_score": 75
            },
            "llm_analysis": {
                "summary": "Database pool exhaustion under load.",
                "overall_health_score": 40,
                "bottlenecks": [{
                    "title": "DB pool exhausted",
                    "severity": "critical",
                    "description": "All 50 connections in use.",
                    "root_cause": "Connection leak",
                    "recommendation": "Raise pool size",
                    "affected_component": "Database"
                }]
            }
        });

        let result = AnalysisResult::from_json(body.to_string().as_bytes()).unwrap();
        let pre = result.pre_analysis.as_ref().unwrap();
        assert_eq!(pre.health_score, Some(75));
        assert_eq!(pre.log_levels.get("ERROR"), Some(&1));
        assert_eq!(pre.metrics_summary.cpu_series, vec![12.0, 89.0]);
        assert_eq!(pre.extra.get("anomalies_detected"), Some(&json!(1)));

        let llm = result.llm_analysis.as_ref().unwrap();
        assert_eq!(llm.bottlenecks().len(), 1);
        assert_eq!(llm.bottlenecks()[0].severity, Severity::Critical);
        assert_eq!(result.health_score(), Some(75));
    }

    #[test]
    fn test_decodes_camel_case_payload() {
        let body = json!({
            "preAnalysis": {
                "healthScore": 42,
                "logLevelCounts": {"WARN": 3},
                "metricsSummary": {"cpuSeries": [1, 2], "maxCpu": 2},
                "parsedEntries": 9
            },
            "llmAnalysis": {
                "summary": "ok",
                "rootCause": "GC pauses",
                "overallHealthScore": 55,
                "immediateActions": ["Restart pods"],
                "shortTermFixes": ["Tune heap"]
            }
        });

        let result = AnalysisResult::from_json(body.to_string().as_bytes()).unwrap();
        let pre = result.pre_analysis.unwrap();
        assert_eq!(pre.health_score, Some(42));
        assert_eq!(pre.log_levels.get("WARN"), Some(&3));
        assert_eq!(pre.metrics_summary.max_cpu, Some(2.0));
        assert_eq!(pre.parsed_entries, Some(9));
        match result.llm_analysis.unwrap() {
            LlmAnalysis::RootCause(rc) => {
                assert_eq!(rc.root_cause.as_deref(), Some("GC pauses"));
                assert_eq!(rc.immediate_actions, vec!["Restart pods".to_string()]);
            }
            other => panic!("expected root-cause shape, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_fields_degrade_to_absent() {
        let body = json!({
            "pre_analysis": {
                "health_score": "very bad",
                "components": ["api", 7, null, "db"],
                "anomalies": "not a list",
                "log_levels": {"INFO": 3, "ERROR": "many"}
            },
            "llm_analysis": 12
        });

        let result = AnalysisResult::from_json(body.to_string().as_bytes()).unwrap();
        let pre = result.pre_analysis.unwrap();
        assert_eq!(pre.health_score, None);
        assert_eq!(pre.components, vec!["api".to_string(), "db".to_string()]);
        assert!(pre.anomalies.is_empty());
        assert_eq!(pre.log_levels.len(), 1);
        assert!(result.llm_analysis.is_none());
    }

    #[test]
    fn test_both_key_spellings_keep_the_section() {
        let body = json!({
            "pre_analysis": {"health_score": 40, "healthScore": 41, "anomalies": ["a"]}
        });
        let result = AnalysisResult::from_json(body.to_string().as_bytes()).unwrap();
        let pre = result.pre_analysis.unwrap();
        assert_eq!(pre.health_score, Some(40));
        assert_eq!(pre.anomalies, vec!["a".to_string()]);
        assert!(pre.extra.is_empty());
    }

    #[test]
    fn test_both_top_level_spellings_prefer_snake_case() {
        let body = json!({
            "preAnalysis": {"healthScore": 10},
            "pre_analysis": {"health_score": 70},
            "llmAnalysis": {"summary": "camel", "bottlenecks": []},
            "llm_analysis": {"summary": "snake", "bottlenecks": []}
        });
        let result = AnalysisResult::from_json(body.to_string().as_bytes()).unwrap();
        assert_eq!(result.health_score(), Some(70));
        assert_eq!(result.llm_analysis.unwrap().summary(), Some("snake"));
    }

    #[test]
    fn test_legacy_log_level_keys_do_not_collide() {
        let body = json!({
            "pre_analysis": {
                "log_levels": {"INFO": 4},
                "log_level_counts": {"INFO": 9},
                "logLevelCounts": {"INFO": 7},
                "components": ["API"]
            }
        });
        let result = AnalysisResult::from_json(body.to_string().as_bytes()).unwrap();
        let pre = result.pre_analysis.unwrap();
        assert_eq!(pre.log_levels.get("INFO"), Some(&4));
        assert_eq!(pre.components, vec!["API".to_string()]);
    }

    #[test]
    fn test_canonical_key() {
        assert_eq!(canonical_key("healthScore"), "health_score");
        assert_eq!(canonical_key("logLevelCounts"), "log_levels");
        assert_eq!(canonical_key("p99Latency"), "p99_latency");
        assert_eq!(canonical_key("maxCPU"), "max_cpu");
        assert_eq!(canonical_key("INFO"), "INFO");
        assert_eq!(canonical_key("Database"), "Database");
        assert_eq!(canonical_key("max_cpu"), "max_cpu");
    }

    #[test]
    fn test_non_object_body_is_rejected() {
        assert!(AnalysisResult::from_json(b"[1, 2]").is_err());
        assert!(AnalysisResult::from_json(b"null").is_err());
    }

    #[test]
    fn test_empty_object_is_a_valid_result() {
        let result = AnalysisResult::from_json(b"{}").unwrap();
        assert_eq!(result, AnalysisResult::default());
        assert_eq!(result.health_score(), None);
    }

    #[test]
    fn test_health_score_is_clamped() {
        let body = json!({"pre_analysis": {"health_score": 140}});
        let result = AnalysisResult::from_json(body.to_string().as_bytes()).unwrap();
        assert_eq!(result.health_score(), Some(100));
        assert_eq!(result.schema_violations().len(), 2); // out of range + missing llm

        assert_eq!(clamp_score(-20), 0);
        assert_eq!(clamp_score(37), 37);
    }

    #[test]
    fn test_float_scores_are_rounded() {
        let body = json!({"pre_analysis": {"health_score": 38.6}});
        let result = AnalysisResult::from_json(body.to_string().as_bytes()).unwrap();
        assert_eq!(result.health_score(), Some(39));
    }

    #[test]
    fn test_file_summaries_decode() {
        let body = json!({
            "files": [
                {"filename": "app.log", "type": "log", "bytes": 2048},
                {"filename": "metrics.csv", "type": "csv", "rows": 24},
                {"filename": "broken.bin", "status": "failed_read"}
            ]
        });
        let result = AnalysisResult::from_json(body.to_string().as_bytes()).unwrap();
        assert_eq!(result.files.len(), 3);
        assert_eq!(result.files[1].rows, Some(24));
        assert_eq!(result.files[2].status.as_deref(), Some("failed_read"));
    }
}
