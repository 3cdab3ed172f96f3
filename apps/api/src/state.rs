use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::workflow::forwarder::WorkflowForwarder;

/// Shared application state injected into all route handlers via Axum extractors.
/// Built once at startup from `Config`; no per-user state lives here.
#[derive(Clone)]
pub struct AppState {
    pub llm: LlmClient,
    pub forwarder: WorkflowForwarder,
    pub config: Config,
}
