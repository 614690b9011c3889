//! View state controller: which screen is showing, the last result, and
//! whether a request is in flight.
//!
//! All mutation goes through the named transitions on
//! [`ViewStateController`]. Every request is tagged with a monotonically
//! increasing id so that out-of-order responses can be told apart.

pub mod session;

pub use self::session::{PendingDemo, Session};

use crate::client::{AnalysisError, AnalysisInput, AnalyzeRequest};
use crate::model::AnalysisResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Idle,
    Analyzing,
    Ready,
}

/// Navigational state, independent of [`Status`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Screen {
    #[default]
    Upload,
    PreAnalysis,
    LlmAnalysis,
    Manual,
}

impl Screen {
    pub const ALL: [Screen; 4] = [
        Screen::Upload,
        Screen::PreAnalysis,
        Screen::LlmAnalysis,
        Screen::Manual,
    ];

    /// Analysis screens stay disabled until a result is held.
    pub fn requires_result(self) -> bool {
        matches!(self, Screen::PreAnalysis | Screen::LlmAnalysis)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Screen::Upload => "upload",
            Screen::PreAnalysis => "pre-analysis",
            Screen::LlmAnalysis => "llm-analysis",
            Screen::Manual => "manual",
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Screen {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Screen::ALL
            .into_iter()
            .find(|screen| screen.as_str() == s)
            .ok_or_else(|| format!("unknown screen '{}'", s))
    }
}

/// What to do with a response that is not from the latest request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RacePolicy {
    /// Only the most recently issued request may update state.
    #[default]
    LatestIssued,
    /// Whatever arrives last wins, regardless of issue order.
    LastWriteWins,
}

/// Whether a response changed the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Discarded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("the {screen} screen is unavailable until an analysis result is loaded")]
pub struct ScreenLocked {
    pub screen: Screen,
}

/// Handle for one issued request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTicket {
    pub id: u64,
    pub trace_id: Uuid,
}

/// Inline error banner contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBanner {
    pub message: String,
    /// Offer the "load demo data" recovery action.
    pub suggest_demo: bool,
}

impl From<&AnalysisError> for ErrorBanner {
    fn from(err: &AnalysisError) -> Self {
        Self {
            message: err.user_message(),
            suggest_demo: err.suggests_demo(),
        }
    }
}

/// Serializable snapshot of the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub status: Status,
    pub screen: Screen,
    pub error: Option<ErrorBanner>,
    pub latest_request_id: u64,
    pub available_screens: Vec<Screen>,
    pub result: Option<AnalysisResult>,
}

impl ViewState {
    pub fn has_result(&self) -> bool {
        self.result.is_some()
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct ViewStateController {
    status: Status,
    screen: Screen,
    result: Option<Arc<AnalysisResult>>,
    error: Option<ErrorBanner>,
    latest_request: u64,
    policy: RacePolicy,
}

impl Default for ViewStateController {
    fn default() -> Self {
        Self::new(RacePolicy::default())
    }
}

impl ViewStateController {
    pub fn new(policy: RacePolicy) -> Self {
        Self {
            status: Status::Idle,
            screen: Screen::Upload,
            result: None,
            error: None,
            latest_request: 0,
            policy,
        }
    }

    // -- read accessors ------------------------------------------------------

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn result(&self) -> Option<&Arc<AnalysisResult>> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&ErrorBanner> {
        self.error.as_ref()
    }

    pub fn latest_request_id(&self) -> u64 {
        self.latest_request
    }

    pub fn policy(&self) -> RacePolicy {
        self.policy
    }

    pub fn is_available(&self, screen: Screen) -> bool {
        !screen.requires_result() || self.result.is_some()
    }

    pub fn snapshot(&self) -> ViewState {
        ViewState {
            status: self.status,
            screen: self.screen,
            error: self.error.clone(),
            latest_request_id: self.latest_request,
            available_screens: Screen::ALL
                .into_iter()
                .filter(|s| self.is_available(*s))
                .collect(),
            result: self.result.as_deref().cloned(),
        }
    }

    // -- transitions ---------------------------------------------------------

    /// "Start Analysis". Empty input sets the error banner right here and
    /// issues nothing; otherwise the error is cleared and a ticket issued.
    /// A held result stays visible until the new one arrives.
    pub fn begin(
        &mut self,
        input: AnalysisInput,
    ) -> Result<(RequestTicket, AnalyzeRequest), AnalysisError> {
        let request = match input.into_request() {
            Ok(request) => request,
            Err(err) => {
                debug!("Rejected analysis start: empty input");
                self.error = Some(ErrorBanner::from(&err));
                return Err(err);
            }
        };
        Ok((self.issue(), request))
    }

    /// Start a demo load. Same bookkeeping as [`begin`](Self::begin) but
    /// nothing to validate.
    pub fn begin_demo(&mut self) -> RequestTicket {
        self.issue()
    }

    fn issue(&mut self) -> RequestTicket {
        self.latest_request += 1;
        self.error = None;
        self.status = Status::Analyzing;
        RequestTicket {
            id: self.latest_request,
            trace_id: Uuid::new_v4(),
        }
    }

    fn accepts(&self, ticket: &RequestTicket) -> bool {
        match self.policy {
            RacePolicy::LatestIssued => ticket.id == self.latest_request,
            RacePolicy::LastWriteWins => true,
        }
    }

    /// A request succeeded: store the result and jump to the pre-analysis screen.
    ///
    /// The banner is left alone. Issuing already cleared it, so anything
    /// showing now was raised after this request went out.
    pub fn complete(&mut self, ticket: &RequestTicket, result: AnalysisResult) -> Outcome {
        if !self.accepts(ticket) {
            debug!(
                request_id = ticket.id,
                latest = self.latest_request,
                "Discarding stale analysis result"
            );
            return Outcome::Discarded;
        }
        self.result = Some(Arc::new(result));
        self.status = Status::Ready;
        self.screen = Screen::PreAnalysis;
        info!(request_id = ticket.id, trace_id = %ticket.trace_id, "Analysis result stored");
        Outcome::Applied
    }

    /// A request failed: raise the banner, stay on the current screen.
    ///
    /// Falls back to `Idle`, or to `Ready` when an earlier result is still
    /// held so its screens stay reachable.
    pub fn fail(&mut self, ticket: &RequestTicket, err: &AnalysisError) -> Outcome {
        if !self.accepts(ticket) {
            debug!(request_id = ticket.id, error = %err, "Discarding stale analysis failure");
            return Outcome::Discarded;
        }
        warn!(request_id = ticket.id, trace_id = %ticket.trace_id, error = %err, "Analysis failed");
        self.error = Some(ErrorBanner::from(err));
        self.status = self.resting_status();
        Outcome::Applied
    }

    /// A request was cancelled before it produced anything.
    pub fn abandon(&mut self, ticket: &RequestTicket) -> Outcome {
        if ticket.id != self.latest_request || self.status != Status::Analyzing {
            return Outcome::Discarded;
        }
        self.status = self.resting_status();
        Outcome::Applied
    }

    pub fn select_screen(&mut self, screen: Screen) -> Result<(), ScreenLocked> {
        if !self.is_available(screen) {
            return Err(ScreenLocked { screen });
        }
        self.screen = screen;
        Ok(())
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    fn resting_status(&self) -> Status {
        if self.result.is_some() {
            Status::Ready
        } else {
            Status::Idle
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PreAnalysis;

    fn tagged(tag: &str) -> AnalysisResult {
        AnalysisResult {
            pre_analysis: Some(PreAnalysis {
                components: vec![tag.to_string()],
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn tag_of(c: &ViewStateController) -> &str {
        &c.result().unwrap().pre_analysis.as_ref().unwrap().components[0]
    }

    fn transport(msg: &str) -> AnalysisError {
        AnalysisError::Transport {
            message: msg.to_string(),
            status: None,
        }
    }

    #[test]
    fn test_initial_state() {
        let c = ViewStateController::default();
        assert_eq!(c.status(), Status::Idle);
        assert_eq!(c.screen(), Screen::Upload);
        assert!(c.result().is_none());
        assert!(c.error().is_none());
        assert_eq!(c.policy(), RacePolicy::LatestIssued);
    }

    #[test]
    fn test_success_advances_to_pre_analysis() {
        let mut c = ViewStateController::default();
        let (ticket, request) = c.begin(AnalysisInput::paste("[INFO] ok")).unwrap();
        assert_eq!(request, AnalyzeRequest::Text("[INFO] ok".into()));
        assert_eq!(c.status(), Status::Analyzing);
        assert_eq!(ticket.id, 1);

        assert_eq!(c.complete(&ticket, tagged("a")), Outcome::Applied);
        assert_eq!(c.status(), Status::Ready);
        assert_eq!(c.screen(), Screen::PreAnalysis);
        assert_eq!(tag_of(&c), "a");
    }

    #[test]
    fn test_empty_input_sets_error_synchronously() {
        let mut c = ViewStateController::default();
        let err = c.begin(AnalysisInput::paste("")).unwrap_err();
        assert_eq!(err, AnalysisError::EmptyInput);
        assert_eq!(c.status(), Status::Idle);
        assert_eq!(c.latest_request_id(), 0);
        let banner = c.error().unwrap();
        assert!(!banner.message.is_empty());
        assert!(!banner.suggest_demo);
    }

    #[test]
    fn test_empty_start_during_analysis_keeps_banner_after_completion() {
        let mut c = ViewStateController::default();
        let (ticket, _) = c.begin(AnalysisInput::paste("x")).unwrap();
        assert_eq!(c.begin(AnalysisInput::paste("  ")), Err(AnalysisError::EmptyInput));
        assert_eq!(c.status(), Status::Analyzing);
        assert_eq!(c.latest_request_id(), 1);

        assert_eq!(c.complete(&ticket, tagged("a")), Outcome::Applied);
        assert_eq!(c.status(), Status::Ready);
        assert!(c.error().is_some());

        c.dismiss_error();
        assert!(c.error().is_none());
    }

    #[test]
    fn test_last_write_wins_stale_success_keeps_newer_failure_banner() {
        let mut c = ViewStateController::new(RacePolicy::LastWriteWins);
        let (t1, _) = c.begin(AnalysisInput::paste("one")).unwrap();
        let (t2, _) = c.begin(AnalysisInput::paste("two")).unwrap();
        c.fail(&t2, &transport("down"));
        assert_eq!(c.complete(&t1, tagged("one")), Outcome::Applied);
        assert_eq!(tag_of(&c), "one");
        assert!(c.error().is_some());
    }

    #[test]
    fn test_failure_returns_to_idle_without_advancing() {
        let mut c = ViewStateController::default();
        let (ticket, _) = c.begin(AnalysisInput::paste("x")).unwrap();
        assert_eq!(c.fail(&ticket, &transport("connection refused")), Outcome::Applied);
        assert_eq!(c.status(), Status::Idle);
        assert_eq!(c.screen(), Screen::Upload);
        let banner = c.error().unwrap();
        assert!(banner.message.starts_with("connection refused"));
        assert!(banner.suggest_demo);
    }

    #[test]
    fn test_next_attempt_clears_error() {
        let mut c = ViewStateController::default();
        let (t1, _) = c.begin(AnalysisInput::paste("x")).unwrap();
        c.fail(&t1, &transport("boom"));
        assert!(c.error().is_some());
        c.begin(AnalysisInput::paste("y")).unwrap();
        assert!(c.error().is_none());
        assert_eq!(c.status(), Status::Analyzing);
    }

    #[test]
    fn test_previous_result_kept_while_reanalyzing() {
        let mut c = ViewStateController::default();
        let (t1, _) = c.begin(AnalysisInput::paste("x")).unwrap();
        c.complete(&t1, tagged("first"));

        let (t2, _) = c.begin(AnalysisInput::paste("y")).unwrap();
        assert_eq!(c.status(), Status::Analyzing);
        assert_eq!(tag_of(&c), "first");
        assert!(c.is_available(Screen::LlmAnalysis));

        c.fail(&t2, &transport("down"));
        assert_eq!(c.status(), Status::Ready);
        assert_eq!(tag_of(&c), "first");
    }

    #[test]
    fn test_latest_issued_discards_out_of_order_response() {
        let mut c = ViewStateController::new(RacePolicy::LatestIssued);
        let (t1, _) = c.begin(AnalysisInput::paste("one")).unwrap();
        let (t2, _) = c.begin(AnalysisInput::paste("two")).unwrap();

        // Responses arrive in reverse order.
        assert_eq!(c.complete(&t2, tagged("two")), Outcome::Applied);
        assert_eq!(c.complete(&t1, tagged("one")), Outcome::Discarded);

        assert_eq!(c.status(), Status::Ready);
        assert_eq!(tag_of(&c), "two");
    }

    #[test]
    fn test_latest_issued_keeps_analyzing_until_latest_arrives() {
        let mut c = ViewStateController::new(RacePolicy::LatestIssued);
        let (t1, _) = c.begin(AnalysisInput::paste("one")).unwrap();
        let (t2, _) = c.begin(AnalysisInput::paste("two")).unwrap();

        assert_eq!(c.complete(&t1, tagged("one")), Outcome::Discarded);
        assert_eq!(c.status(), Status::Analyzing);
        assert!(c.result().is_none());

        assert_eq!(c.fail(&t1, &transport("late")), Outcome::Discarded);
        assert!(c.error().is_none());

        c.complete(&t2, tagged("two"));
        assert_eq!(tag_of(&c), "two");
    }

    #[test]
    fn test_last_write_wins_applies_whatever_arrives_last() {
        let mut c = ViewStateController::new(RacePolicy::LastWriteWins);
        let (t1, _) = c.begin(AnalysisInput::paste("one")).unwrap();
        let (t2, _) = c.begin(AnalysisInput::paste("two")).unwrap();

        assert_eq!(c.complete(&t2, tagged("two")), Outcome::Applied);
        assert_eq!(c.complete(&t1, tagged("one")), Outcome::Applied);

        assert_eq!(c.status(), Status::Ready);
        assert!(c.result().is_some());
        assert_eq!(tag_of(&c), "one");
    }

    #[test]
    fn test_screens_locked_without_result() {
        let mut c = ViewStateController::default();
        assert_eq!(
            c.select_screen(Screen::PreAnalysis),
            Err(ScreenLocked { screen: Screen::PreAnalysis })
        );
        assert!(c.select_screen(Screen::LlmAnalysis).is_err());
        assert!(c.select_screen(Screen::Manual).is_ok());
        assert_eq!(c.screen(), Screen::Manual);

        let snap = c.snapshot();
        assert_eq!(snap.available_screens, vec![Screen::Upload, Screen::Manual]);
        assert!(!snap.has_result());
    }

    #[test]
    fn test_screens_unlock_after_result() {
        let mut c = ViewStateController::default();
        let ticket = c.begin_demo();
        c.complete(&ticket, AnalysisResult::default());
        assert!(c.select_screen(Screen::LlmAnalysis).is_ok());
        assert_eq!(c.snapshot().available_screens.len(), 4);
    }

    #[test]
    fn test_abandon_only_affects_latest() {
        let mut c = ViewStateController::default();
        let t1 = c.begin_demo();
        let t2 = c.begin_demo();
        assert_eq!(c.abandon(&t1), Outcome::Discarded);
        assert_eq!(c.status(), Status::Analyzing);
        assert_eq!(c.abandon(&t2), Outcome::Applied);
        assert_eq!(c.status(), Status::Idle);
    }

    #[test]
    fn test_screen_parse_and_display() {
        for screen in Screen::ALL {
            assert_eq!(screen.to_string().parse::<Screen>().unwrap(), screen);
        }
        assert!("settings".parse::<Screen>().is_err());
        assert_eq!(
            serde_json::to_string(&Screen::LlmAnalysis).unwrap(),
            "\"llm-analysis\""
        );
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut c = ViewStateController::default();
        let ticket = c.begin_demo();
        c.complete(&ticket, AnalysisResult::default());
        let json = serde_json::to_value(c.snapshot()).unwrap();
        assert_eq!(json["status"], "ready");
        assert_eq!(json["screen"], "pre-analysis");
        assert_eq!(json["latest_request_id"], 1);
    }
}
