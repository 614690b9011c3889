use super::{ExportArtifact, ExportError};
use crate::model::{AnalysisResult, PreAnalysis};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Downloaded `pre-analysis-<epoch-ms>.json` document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreAnalysisSnapshot {
    pub timestamp: DateTime<Utc>,
    pub pre_analysis: PreAnalysis,
}

pub fn snapshot_filename(at: DateTime<Utc>) -> String {
    format!("pre-analysis-{}.json", at.timestamp_millis())
}

/// Pretty-printed snapshot of the pre-analysis. A result without one
/// exports an empty pre-analysis object.
pub fn encode_snapshot(result: &AnalysisResult, at: DateTime<Utc>) -> Result<ExportArtifact, ExportError> {
    let snapshot = PreAnalysisSnapshot {
        timestamp: at,
        pre_analysis: result.pre_analysis.clone().unwrap_or_default(),
    };
    Ok(ExportArtifact {
        filename: snapshot_filename(at),
        content_type: "application/json",
        bytes: serde_json::to_vec_pretty(&snapshot)?,
    })
}

pub fn decode_snapshot(bytes: &[u8]) -> Result<PreAnalysisSnapshot, serde_json::Error> {
    serde_json::from_slice(bytes)
}
