use std::sync::Arc;

use super::security_config::SecurityConfig;
use crate::auth::identity::IdentityProvider;
use crate::services::draft_flow::DraftRegistry;
use crate::ws::hub::WsHub;

/// Shared resources handed to every handler through `web::Data`.
#[derive(Clone)]
pub struct AppState {
    pub security: SecurityConfig,
    pub drafts: Arc<DraftRegistry>,
    pub ws_hub: Arc<WsHub>,
    pub identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    pub fn new(
        security: SecurityConfig,
        drafts: Arc<DraftRegistry>,
        ws_hub: Arc<WsHub>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            security,
            drafts,
            ws_hub,
            identity,
        }
    }

    /// Label of the configured draft store (`memory` or `sql`).
    pub fn store_kind(&self) -> &'static str {
        self.drafts.store_kind()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("security", &self.security)
            .field("store", &self.store_kind())
            .field("live_drafts", &self.drafts.live_sessions())
            .finish_non_exhaustive()
    }
}
