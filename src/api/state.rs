use crate::config::PerfpulseConfig;
use crate::state::Session;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub session: Session,
    pub config: Arc<PerfpulseConfig>,
}

impl AppState {
    pub fn new(session: Session, config: PerfpulseConfig) -> Self {
        Self {
            session,
            config: Arc::new(config),
        }
    }
}
