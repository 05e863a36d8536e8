//! Server application state shared across handlers

use crate::gateway::{GatewayConfig, LlmGateway};
use std::sync::Arc;

/// Shared state for the server. The gateway client is the only shared
/// resource: intake runs themselves live in the browser session, so there
/// is no cross-request mutable state to guard.
#[derive(Clone)]
pub struct ServerAppState {
    /// Client for the external model APIs
    pub gateway: Arc<LlmGateway>,
}

impl ServerAppState {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            gateway: Arc::new(LlmGateway::new(config)),
        }
    }
}
