//! Analysis request client -- talks to the external analysis service.
//!
//! The service does all parsing, statistics and LLM reasoning. This side only
//! ships the input over and maps every failure into one [`AnalysisError`].

pub mod demo;
pub mod http;
pub mod input;

pub use self::demo::DemoBackend;
pub use self::http::HttpAnalysisClient;
pub use self::input::{AnalysisInput, InputMode, UploadedFile};

use crate::model::AnalysisResult;
use thiserror::Error;

/// Appended to every request failure shown to the user.
pub const DEMO_SUGGESTION: &str = "Load the demo data to explore the dashboard without a backend.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// Nothing pasted and nothing selected; no request was made.
    #[error("please paste logs or select at least one file before starting analysis")]
    EmptyInput,

    /// Network failure, or a non-2xx response without an error body.
    #[error("{message}")]
    Transport { message: String, status: Option<u16> },

    /// The service answered with an explicit `error` field.
    #[error("{message}")]
    Service {
        message: String,
        kind: Option<String>,
        hint: Option<String>,
        status: u16,
    },

    /// A 2xx response whose body is not an analysis result.
    #[error("analysis service returned an unreadable response: {message}")]
    Decode { message: String },
}

impl AnalysisError {
    /// Whether the fallback to demo data should be offered.
    pub fn suggests_demo(&self) -> bool {
        !matches!(self, AnalysisError::EmptyInput)
    }

    /// The message exactly as the user should see it.
    pub fn user_message(&self) -> String {
        if !self.suggests_demo() {
            return self.to_string();
        }
        match self {
            AnalysisError::Service { hint: Some(hint), .. } => {
                format!("{} ({}). {}", self, hint, DEMO_SUGGESTION)
            }
            _ => format!("{}. {}", self, DEMO_SUGGESTION),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            AnalysisError::Transport { status, .. } => *status,
            AnalysisError::Service { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// What gets sent: pasted text or uploaded files, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalyzeRequest {
    Text(String),
    Files(Vec<UploadedFile>),
}

impl AnalyzeRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            AnalyzeRequest::Text(_) => "text",
            AnalyzeRequest::Files(_) => "files",
        }
    }

    /// Payload size in bytes, for logging.
    pub fn payload_len(&self) -> usize {
        match self {
            AnalyzeRequest::Text(text) => text.len(),
            AnalyzeRequest::Files(files) => files.iter().map(UploadedFile::len).sum(),
        }
    }
}

/// Anything that can turn an [`AnalyzeRequest`] into an [`AnalysisResult`].
#[async_trait::async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Run one analysis. No retries, no caching.
    async fn analyze(&self, request: AnalyzeRequest) -> Result<AnalysisResult, AnalysisError>;
}
