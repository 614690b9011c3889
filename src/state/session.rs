//! Async wrapper pairing the controller with an analysis backend.
//!
//! The controller lock is never held across the network await. Demo loads
//! are scheduled tasks with a cancellation token; issuing any new request,
//! another demo load, or shutting down cancels the pending one. Issuing and
//! swapping the token happen under the same controller write guard, so a
//! cancelled demo is always older than the request that cancelled it.

use super::{Outcome, RacePolicy, RequestTicket, Screen, ScreenLocked, ViewState, ViewStateController};
use crate::client::{AnalysisBackend, AnalysisError, AnalysisInput};
use crate::mock;
use crate::model::AnalysisResult;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

#[derive(Clone)]
pub struct Session {
    controller: Arc<RwLock<ViewStateController>>,
    backend: Arc<dyn AnalysisBackend>,
    demo_delay: Duration,
    pending_demo: Arc<Mutex<Option<CancellationToken>>>,
}

/// A scheduled demo load.
pub struct PendingDemo {
    pub ticket: RequestTicket,
    handle: JoinHandle<Option<Outcome>>,
}

impl PendingDemo {
    /// Wait for the load to land. `None` when it was cancelled.
    pub async fn wait(self) -> Option<Outcome> {
        self.handle.await.ok().flatten()
    }
}

impl Session {
    pub fn new(backend: Arc<dyn AnalysisBackend>, policy: RacePolicy, demo_delay: Duration) -> Self {
        Self {
            controller: Arc::new(RwLock::new(ViewStateController::new(policy))),
            backend,
            demo_delay,
            pending_demo: Arc::new(Mutex::new(None)),
        }
    }

    pub async fn snapshot(&self) -> ViewState {
        self.controller.read().await.snapshot()
    }

    pub async fn result(&self) -> Option<Arc<AnalysisResult>> {
        self.controller.read().await.result().cloned()
    }

    pub async fn select_screen(&self, screen: Screen) -> Result<ViewState, ScreenLocked> {
        let mut controller = self.controller.write().await;
        controller.select_screen(screen)?;
        Ok(controller.snapshot())
    }

    pub async fn dismiss_error(&self) -> ViewState {
        let mut controller = self.controller.write().await;
        controller.dismiss_error();
        controller.snapshot()
    }

    /// Validate, issue, await the backend, and apply the response.
    ///
    /// The error is returned even when the controller discarded it as stale.
    pub async fn analyze(&self, input: AnalysisInput) -> Result<Outcome, AnalysisError> {
        let (ticket, request) = {
            let mut controller = self.controller.write().await;
            let issued = controller.begin(input)?;
            self.cancel_pending_demo();
            issued
        };

        info!(
            request_id = ticket.id,
            trace_id = %ticket.trace_id,
            backend = self.backend.name(),
            kind = request.kind(),
            bytes = request.payload_len(),
            "Issuing analysis request"
        );
        let response = self.backend.analyze(request).await;

        let mut controller = self.controller.write().await;
        match response {
            Ok(result) => Ok(controller.complete(&ticket, result)),
            Err(err) => {
                controller.fail(&ticket, &err);
                Err(err)
            }
        }
    }

    /// Schedule mock data to land after the configured delay.
    pub async fn load_demo(&self) -> PendingDemo {
        let token = CancellationToken::new();
        let ticket = {
            let mut controller = self.controller.write().await;
            let ticket = controller.begin_demo();
            if let Some(previous) = self.swap_pending(Some(token.clone())) {
                previous.cancel();
            }
            ticket
        };

        info!(request_id = ticket.id, delay_ms = self.demo_delay.as_millis() as u64, "Scheduling demo load");
        let controller = self.controller.clone();
        let delay = self.demo_delay;
        let task_ticket = ticket.clone();
        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    debug!(request_id = task_ticket.id, "Demo load cancelled");
                    controller.write().await.abandon(&task_ticket);
                    None
                }
                _ = tokio::time::sleep(delay) => {
                    let result = mock::generate_analysis();
                    Some(controller.write().await.complete(&task_ticket, result))
                }
            }
        });

        PendingDemo { ticket, handle }
    }

    /// Cancel a scheduled demo load. Returns whether one was pending.
    pub fn cancel_pending_demo(&self) -> bool {
        match self.swap_pending(None) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Teardown: drop anything still scheduled.
    pub fn shutdown(&self) {
        if self.cancel_pending_demo() {
            info!("Cancelled pending demo load on shutdown");
        }
    }

    fn swap_pending(&self, next: Option<CancellationToken>) -> Option<CancellationToken> {
        let mut slot = self
            .pending_demo
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        std::mem::replace(&mut *slot, next)
    }
}
