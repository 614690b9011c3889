//! API route definitions.

use super::state::AppState;
use crate::client::{AnalysisError, AnalysisInput, InputMode, UploadedFile};
use crate::export::{self, ExportArtifact, ExportFormat};
use crate::state::{Outcome, Screen, ViewState};
use crate::views;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/state", get(view_state))
        .route("/analyze", post(analyze))
        .route("/demo", post(load_demo))
        .route("/screen", post(select_screen))
        .route("/error", delete(dismiss_error))
        .route("/views/{screen}", get(screen_view))
        .route("/export/json", get(export_json))
        .route("/export/report", get(export_report))
}

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct FileBody {
    pub name: String,
    pub content: String,
}

/// Browser-side form contents. Files arrive already read to text.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AnalyzeBody {
    pub mode: InputMode,
    pub text: String,
    pub files: Vec<FileBody>,
}

impl From<AnalyzeBody> for AnalysisInput {
    fn from(body: AnalyzeBody) -> Self {
        AnalysisInput {
            mode: body.mode,
            text: body.text,
            files: body
                .files
                .into_iter()
                .map(|f| UploadedFile::from_text(f.name, f.content))
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ScreenBody {
    pub screen: Screen,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "data": {
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION"),
            "backend": state.config.backend.base_url,
        },
        "meta": {
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "version": env!("CARGO_PKG_VERSION")
        }
    }))
}

async fn view_state(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "data": state.session.snapshot().await }))
}

async fn analyze(State(state): State<AppState>, Json(body): Json<AnalyzeBody>) -> Response {
    let outcome = state.session.analyze(body.into()).await;
    let snapshot = state.session.snapshot().await;
    match outcome {
        Ok(outcome) => (
            StatusCode::OK,
            Json(json!({ "data": snapshot, "meta": { "outcome": outcome_label(outcome) } })),
        )
            .into_response(),
        Err(err) => {
            let status = match err {
                AnalysisError::EmptyInput => StatusCode::BAD_REQUEST,
                _ => StatusCode::BAD_GATEWAY,
            };
            (status, Json(error_body(&err, snapshot))).into_response()
        }
    }
}

async fn load_demo(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let pending = state.session.load_demo().await;
    let snapshot = state.session.snapshot().await;
    (
        StatusCode::ACCEPTED,
        Json(json!({
            "data": snapshot,
            "meta": {
                "request_id": pending.ticket.id,
                "delay_ms": state.config.dashboard.demo_delay_ms,
            }
        })),
    )
}

async fn select_screen(State(state): State<AppState>, Json(body): Json<ScreenBody>) -> Response {
    match state.session.select_screen(body.screen).await {
        Ok(snapshot) => Json(json!({ "data": snapshot })).into_response(),
        Err(locked) => (
            StatusCode::CONFLICT,
            Json(json!({ "error": { "message": locked.to_string(), "screen": locked.screen } })),
        )
            .into_response(),
    }
}

async fn dismiss_error(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "data": state.session.dismiss_error().await }))
}

async fn screen_view(State(state): State<AppState>, Path(screen): Path<String>) -> Response {
    let Ok(screen) = screen.parse::<Screen>() else {
        return (StatusCode::NOT_FOUND, Json(json!({ "error": { "message": "unknown screen" } })))
            .into_response();
    };
    let snapshot = state.session.snapshot().await;
    Json(json!({ "data": views::build(screen, &snapshot) })).into_response()
}

async fn export_json(State(state): State<AppState>) -> Response {
    export_artifact(&state, ExportFormat::Json).await
}

async fn export_report(State(state): State<AppState>) -> Response {
    export_artifact(&state, ExportFormat::Html).await
}

async fn export_artifact(state: &AppState, format: ExportFormat) -> Response {
    let Some(result) = state.session.result().await else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": { "message": export::ExportError::NoResult.to_string() } })),
        )
            .into_response();
    };
    match export::export(&result, format, chrono::Utc::now()) {
        Ok(artifact) => attachment(artifact),
        Err(e) => {
            warn!(error = %e, ?format, "Export failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": { "message": e.to_string() } })),
            )
                .into_response()
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn attachment(artifact: ExportArtifact) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", artifact.filename);
    (
        [
            (header::CONTENT_TYPE, artifact.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        artifact.bytes,
    )
        .into_response()
}

fn error_body(err: &AnalysisError, snapshot: ViewState) -> Value {
    json!({
        "error": {
            "message": err.user_message(),
            "suggest_demo": err.suggests_demo(),
            "upstream_status": err.status(),
        },
        "data": snapshot,
    })
}

fn outcome_label(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Applied => "applied",
        Outcome::Discarded => "discarded",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::router;
    use crate::client::{AnalysisBackend, AnalyzeRequest, DemoBackend};
    use crate::config::PerfpulseConfig;
    use crate::model::AnalysisResult;
    use crate::state::{RacePolicy, Session};
    use axum::body::Body;
    use axum::http::Request;
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt; // for `oneshot`

    struct DownBackend;

    #[async_trait::async_trait]
    impl AnalysisBackend for DownBackend {
        fn name(&self) -> &str {
            "down"
        }

        async fn analyze(&self, _: AnalyzeRequest) -> Result<AnalysisResult, AnalysisError> {
            Err(AnalysisError::Transport {
                message: "error sending request".into(),
                status: None,
            })
        }
    }

    fn app_with(backend: Arc<dyn AnalysisBackend>) -> (Router, AppState) {
        let mut config = PerfpulseConfig::default();
        config.dashboard.demo_delay_ms = 0;
        let session = Session::new(backend, RacePolicy::LatestIssued, Duration::ZERO);
        let state = AppState::new(session, config);
        (router(state.clone()), state)
    }

    fn app() -> (Router, AppState) {
        app_with(Arc::new(DemoBackend::default()))
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), 1_000_000)
            .await
            .unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (app, _) = app();
        let (status, json) = send(app, get("/api/v1/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["status"], "ok");
        assert!(json["data"]["version"].is_string());
    }

    #[tokio::test]
    async fn test_initial_state_is_idle() {
        let (app, _) = app();
        let (status, json) = send(app, get("/api/v1/state")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["status"], "idle");
        assert_eq!(json["data"]["screen"], "upload");
        assert_eq!(json["data"]["available_screens"], json!(["upload", "manual"]));
    }

    #[tokio::test]
    async fn test_analyze_applies_result() {
        let (app, _) = app();
        let body = json!({ "mode": "paste", "text": "[INFO] ok" });
        let (status, json) = send(app, post_json("/api/v1/analyze", body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["meta"]["outcome"], "applied");
        assert_eq!(json["data"]["status"], "ready");
        assert_eq!(json["data"]["screen"], "pre-analysis");
    }

    #[tokio::test]
    async fn test_analyze_empty_input_is_rejected_locally() {
        let (app, _) = app();
        let body = json!({ "mode": "upload", "text": "ignored", "files": [] });
        let (status, json) = send(app, post_json("/api/v1/analyze", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["suggest_demo"], false);
        assert_eq!(json["data"]["latest_request_id"], 0);
    }

    #[tokio::test]
    async fn test_backend_failure_maps_to_bad_gateway() {
        let (app, _) = app_with(Arc::new(DownBackend));
        let body = json!({ "text": "[ERROR] boom" });
        let (status, json) = send(app, post_json("/api/v1/analyze", body)).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json["error"]["suggest_demo"], true);
        assert_eq!(json["data"]["status"], "idle");
        assert!(json["data"]["error"]["message"]
            .as_str()
            .unwrap()
            .starts_with("error sending request"));
    }

    #[tokio::test]
    async fn test_screen_locked_until_result() {
        let (app, state) = app();
        let body = json!({ "screen": "llm-analysis" });
        let (status, _) = send(app.clone(), post_json("/api/v1/screen", body.clone())).await;
        assert_eq!(status, StatusCode::CONFLICT);

        state.session.load_demo().await.wait().await;
        let (status, json) = send(app, post_json("/api/v1/screen", body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["screen"], "llm-analysis");
    }

    #[tokio::test]
    async fn test_demo_endpoint_schedules_load() {
        let (app, state) = app();
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/demo")
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(app, request).await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(json["meta"]["request_id"], 1);

        // Zero delay: the task lands as soon as it is polled.
        for _ in 0..50 {
            if state.session.result().await.is_some() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("demo result never landed");
    }

    #[tokio::test]
    async fn test_views_render_without_result() {
        let (app, _) = app();
        for screen in ["upload", "pre-analysis", "llm-analysis", "manual"] {
            let (status, json) = send(app.clone(), get(&format!("/api/v1/views/{}", screen))).await;
            assert_eq!(status, StatusCode::OK, "{}", screen);
            assert_eq!(json["data"]["screen"], screen);
        }
        let (status, _) = send(app, get("/api/v1/views/settings")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_export_requires_result() {
        let (app, _) = app();
        let (status, _) = send(app, get("/api/v1/export/json")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_export_downloads_artifacts() {
        let (app, state) = app();
        state.session.load_demo().await.wait().await;

        let response = app.clone().oneshot(get("/api/v1/export/report")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap();
        assert!(disposition.starts_with("attachment; filename=\"performance-report-"));
        assert!(response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html"));

        let (status, json) = send(app, get("/api/v1/export/json")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(json["pre_analysis"]["health_score"].is_number());
        assert!(json["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_unknown_path_falls_back_to_404() {
        let (app, _) = app();
        let response = app.oneshot(get("/nope")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
