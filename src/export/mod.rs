//! Export encoders: JSON snapshot of the pre-analysis and a standalone HTML
//! report of the LLM analysis.
//!
//! Both are pure functions of the stored result and a clock instant. They
//! only produce bytes; writing them somewhere is the caller's business.

pub mod report;
pub mod snapshot;

pub use self::report::render_report;
pub use self::snapshot::{decode_snapshot, encode_snapshot, PreAnalysisSnapshot};

use crate::model::AnalysisResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no analysis result to export")]
    NoResult,

    #[error("failed to encode snapshot: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to render report: {0}")]
    Template(#[from] askama::Error),

    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Html,
}

/// A finished download: name, MIME type and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    /// Write into `dir` under the artifact's own file name.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        let path = dir.join(&self.filename);
        std::fs::create_dir_all(dir).map_err(|source| ExportError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        std::fs::write(&path, &self.bytes).map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), bytes = self.bytes.len(), "Export written");
        Ok(path)
    }
}

/// Encode `result` in the requested format.
pub fn export(
    result: &AnalysisResult,
    format: ExportFormat,
    at: DateTime<Utc>,
) -> Result<ExportArtifact, ExportError> {
    match format {
        ExportFormat::Json => encode_snapshot(result, at),
        ExportFormat::Html => render_report(result, at),
    }
}
