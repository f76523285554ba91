//! Shared WebSocket adapter state.

use std::sync::Arc;

use super::OriginAllowList;
use super::registry::WsConnectionRegistry;

/// Dependency bundle for the notification socket endpoint.
#[derive(Clone)]
pub struct WsState {
    pub registry: Arc<WsConnectionRegistry>,
    pub origins: OriginAllowList,
}

impl WsState {
    pub fn new(registry: Arc<WsConnectionRegistry>, origins: OriginAllowList) -> Self {
        Self { registry, origins }
    }
}
