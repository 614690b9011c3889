//! Upload screen: input tabs, the file list and the start button state.

use crate::client::input::ACCEPTED_EXTENSIONS;
use crate::client::{AnalysisInput, InputMode};
use crate::model::FileSummary;
use crate::state::{ErrorBanner, Status, ViewState};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    pub name: String,
    pub bytes: usize,
    /// Extension is one the picker offers. Advisory.
    pub accepted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadView {
    pub status: Status,
    pub analyzing: bool,
    pub mode: InputMode,
    pub text_chars: usize,
    pub files: Vec<FileEntry>,
    pub accepted_extensions: Vec<String>,
    pub can_start: bool,
    pub error: Option<ErrorBanner>,
    pub has_result: bool,
    /// Per-file summaries from the last multi-file analysis.
    pub analyzed_files: Vec<FileSummary>,
}

impl UploadView {
    /// `input` is the draft the user is editing, when the caller has one.
    pub fn build(state: &ViewState, input: Option<&AnalysisInput>) -> Self {
        let analyzing = state.status == Status::Analyzing;
        let files = input
            .map(|i| {
                i.files
                    .iter()
                    .map(|f| FileEntry {
                        name: f.name.clone(),
                        bytes: f.len(),
                        accepted: f.is_accepted(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            status: state.status,
            analyzing,
            mode: input.map(|i| i.mode).unwrap_or_default(),
            text_chars: input.map_or(0, |i| i.text.chars().count()),
            files,
            accepted_extensions: ACCEPTED_EXTENSIONS.iter().map(|e| format!(".{}", e)).collect(),
            can_start: !analyzing && input.is_some_and(|i| !i.is_empty()),
            error: state.error.clone(),
            has_result: state.has_result(),
            analyzed_files: state
                .result
                .as_ref()
                .map(|r| r.files.clone())
                .unwrap_or_default(),
        }
    }
}
