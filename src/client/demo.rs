//! Offline backend that answers every request with synthetic data.

use super::{AnalysisBackend, AnalysisError, AnalyzeRequest};
use crate::mock;
use crate::model::AnalysisResult;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct DemoBackend {
    latency: Duration,
}

impl DemoBackend {
    /// Answer after `latency`, to make the analyzing state visible.
    pub fn with_latency(latency: Duration) -> Self {
        Self { latency }
    }
}

#[async_trait]
impl AnalysisBackend for DemoBackend {
    fn name(&self) -> &str {
        "demo"
    }

    async fn analyze(&self, request: AnalyzeRequest) -> Result<AnalysisResult, AnalysisError> {
        debug!(kind = request.kind(), bytes = request.payload_len(), "Demo backend ignoring payload");
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        Ok(mock::generate_analysis())
    }
}
