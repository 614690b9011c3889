//! View models for the four dashboard screens.
//!
//! Each builder is a pure function of the controller snapshot. Missing or
//! malformed data never fails a build; it shows up as an empty panel with a
//! placeholder message or as a neutral health band.

pub mod insights;
pub mod manual;
pub mod pre_analysis;
pub mod upload;

pub use self::insights::InsightsView;
pub use self::manual::ManualView;
pub use self::pre_analysis::PreAnalysisView;
pub use self::upload::UploadView;

use crate::state::{Screen, ViewState};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthBand {
    Critical,
    Degraded,
    Healthy,
    Unknown,
}

impl HealthBand {
    pub fn from_score(score: Option<u8>) -> Self {
        match score {
            Some(s) if s < 50 => HealthBand::Critical,
            Some(s) if s < 80 => HealthBand::Degraded,
            Some(_) => HealthBand::Healthy,
            None => HealthBand::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            HealthBand::Critical => "Critical",
            HealthBand::Degraded => "Degraded",
            HealthBand::Healthy => "Healthy",
            HealthBand::Unknown => "Unknown",
        }
    }
}

/// Health gauge contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthView {
    pub score: Option<u8>,
    pub band: HealthBand,
    pub display: String,
}

impl HealthView {
    pub fn new(score: Option<u8>) -> Self {
        Self {
            score,
            band: HealthBand::from_score(score),
            display: score.map_or_else(|| "N/A".to_string(), |s| format!("{}/100", s)),
        }
    }
}

/// A list that knows what to say when it is empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel<T> {
    pub items: Vec<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<&'static str>,
}

impl<T> Panel<T> {
    pub fn new(items: Vec<T>, placeholder: &'static str) -> Self {
        let empty_message = items.is_empty().then_some(placeholder);
        Self { items, empty_message }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

/// One screen's view model, tagged with the screen it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "screen", content = "view", rename_all = "kebab-case")]
pub enum ScreenView {
    Upload(UploadView),
    PreAnalysis(PreAnalysisView),
    LlmAnalysis(InsightsView),
    Manual(ManualView),
}

/// Build the view model for `screen` from a controller snapshot.
pub fn build(screen: Screen, state: &ViewState) -> ScreenView {
    let result = state.result.as_ref();
    match screen {
        Screen::Upload => ScreenView::Upload(UploadView::build(state, None)),
        Screen::PreAnalysis => ScreenView::PreAnalysis(PreAnalysisView::build(result)),
        Screen::LlmAnalysis => ScreenView::LlmAnalysis(InsightsView::build(result)),
        Screen::Manual => ScreenView::Manual(ManualView::build()),
    }
}
