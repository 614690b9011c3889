use super::{AnalysisBackend, AnalysisError, AnalyzeRequest};
use crate::model::AnalysisResult;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

pub const ANALYZE_PATH: &str = "/api/analyze";
pub const ANALYZE_MULTI_PATH: &str = "/api/analyze-multi";

/// reqwest client for the analysis service.
pub struct HttpAnalysisClient {
    client: Client,
    base_url: String,
}

impl HttpAnalysisClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn build(&self, request: AnalyzeRequest) -> RequestBuilder {
        match request {
            AnalyzeRequest::Text(logs) => self
                .client
                .post(self.endpoint(ANALYZE_PATH))
                .json(&json!({ "logs": logs })),
            AnalyzeRequest::Files(files) => {
                let form = files.into_iter().fold(Form::new(), |form, file| {
                    form.part("files", Part::bytes(file.bytes).file_name(file.name))
                });
                self.client
                    .post(self.endpoint(ANALYZE_MULTI_PATH))
                    .multipart(form)
            }
        }
    }
}

#[async_trait::async_trait]
impl AnalysisBackend for HttpAnalysisClient {
    fn name(&self) -> &str {
        &self.base_url
    }

    async fn analyze(&self, request: AnalyzeRequest) -> Result<AnalysisResult, AnalysisError> {
        let response = self
            .build(request)
            .send()
            .await
            .map_err(|e| AnalysisError::Transport {
                message: format!("could not reach analysis service: {}", e),
                status: e.status().map(|s| s.as_u16()),
            })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| AnalysisError::Transport {
            message: format!("analysis response was interrupted: {}", e),
            status: Some(status.as_u16()),
        })?;
        debug!(status = status.as_u16(), bytes = body.len(), "Analysis service responded");

        let result = interpret_response(status, &body)?;
        let problems = result.schema_violations();
        if !problems.is_empty() {
            // Rendered as degraded fields, not an error.
            warn!(?problems, "Analysis result is incomplete");
        }
        Ok(result)
    }
}

/// Map a status + body pair to a result or an [`AnalysisError`].
///
/// An `error` field wins over the status code, so a 200 carrying
/// `{"error": ...}` still fails.
pub fn interpret_response(status: StatusCode, body: &[u8]) -> Result<AnalysisResult, AnalysisError> {
    let parsed: Result<Value, _> = serde_json::from_slice(body);

    if let Ok(Value::Object(map)) = &parsed {
        if let Some(error) = map.get("error").filter(|e| !e.is_null()) {
            let text_field = |key: &str| map.get(key).and_then(Value::as_str).map(str::to_string);
            return Err(AnalysisError::Service {
                message: match error {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                },
                kind: text_field("type"),
                hint: text_field("hint"),
                status: status.as_u16(),
            });
        }
    }

    if !status.is_success() {
        return Err(AnalysisError::Transport {
            message: format!("analysis service responded with HTTP {}", status),
            status: Some(status.as_u16()),
        });
    }

    let value = parsed.map_err(|e| AnalysisError::Decode {
        message: e.to_string(),
    })?;
    if !value.is_object() {
        return Err(AnalysisError::Decode {
            message: "expected a JSON object".to_string(),
        });
    }
    serde_json::from_value(value).map_err(|e| AnalysisError::Decode {
        message: e.to_string(),
    })
}
