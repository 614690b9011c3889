//! User-supplied input: pasted text or uploaded files.

use super::{AnalysisError, AnalyzeRequest};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::path::Path;

/// File extensions the upload picker offers. Advisory only; the service
/// decides what it can parse.
pub const ACCEPTED_EXTENSIONS: [&str; 4] = ["log", "txt", "json", "csv"];

/// Which input tab is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    #[default]
    Paste,
    Upload,
}

/// One uploaded file, held as raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    pub fn from_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(name, text.into().into_bytes())
    }

    /// Read a file from disk, keeping only its file name.
    pub async fn read(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, bytes))
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Contents as text: UTF-8, falling back to Latin-1.
    pub fn text(&self) -> Cow<'_, str> {
        match std::str::from_utf8(&self.bytes) {
            Ok(s) => Cow::Borrowed(s),
            Err(_) => Cow::Owned(self.bytes.iter().map(|&b| b as char).collect()),
        }
    }

    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
    }

    pub fn is_accepted(&self) -> bool {
        is_accepted_extension(&self.name)
    }
}

pub fn is_accepted_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .is_some_and(|e| ACCEPTED_EXTENSIONS.contains(&e.as_str()))
}

/// The upload screen's form contents at the moment "Start Analysis" is pressed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisInput {
    pub mode: InputMode,
    pub text: String,
    pub files: Vec<UploadedFile>,
}

impl AnalysisInput {
    pub fn paste(text: impl Into<String>) -> Self {
        Self {
            mode: InputMode::Paste,
            text: text.into(),
            files: Vec::new(),
        }
    }

    pub fn upload(files: Vec<UploadedFile>) -> Self {
        Self {
            mode: InputMode::Upload,
            text: String::new(),
            files,
        }
    }

    /// True when the active mode has nothing to send.
    pub fn is_empty(&self) -> bool {
        match self.mode {
            InputMode::Paste => self.text.trim().is_empty(),
            InputMode::Upload => self.files.is_empty(),
        }
    }

    /// Turn the form into a request. The active mode decides what is sent;
    /// the other tab's contents are ignored.
    pub fn into_request(self) -> Result<AnalyzeRequest, AnalysisError> {
        if self.is_empty() {
            return Err(AnalysisError::EmptyInput);
        }
        Ok(match self.mode {
            InputMode::Paste => AnalyzeRequest::Text(self.text),
            InputMode::Upload => AnalyzeRequest::Files(self.files),
        })
    }
}
