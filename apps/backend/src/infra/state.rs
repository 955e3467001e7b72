use std::sync::Arc;

use tracing::info;

use crate::adapters::drafts_sea::SeaDraftStore;
use crate::auth::identity::{IdentityProvider, RosterIdentityProvider};
use crate::config::draft::DraftConfig;
use crate::error::AppError;
use crate::infra::db::{bootstrap_db, sanitize_db_url};
use crate::repos::drafts::{DraftStore, MemoryDraftStore};
use crate::services::draft_flow::DraftRegistry;
use crate::services::notifier::Notifier;
use crate::state::app_state::AppState;
use crate::state::security_config::SecurityConfig;
use crate::ws::hub::WsHub;

/// Assembles `AppState` for `main` and for tests.
///
/// Without a database URL or explicit store the drafts live in memory.
/// Without an explicit notifier events fan out to the websocket hub.
pub struct StateBuilder {
    security: SecurityConfig,
    database_url: Option<String>,
    store: Option<Arc<dyn DraftStore>>,
    draft_config: DraftConfig,
    identity: Option<Arc<dyn IdentityProvider>>,
    notifier: Option<Arc<dyn Notifier>>,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self {
            security: SecurityConfig::for_tests(),
            database_url: None,
            store: None,
            draft_config: DraftConfig::default(),
            identity: None,
            notifier: None,
        }
    }

    pub fn with_security(mut self, security: SecurityConfig) -> Self {
        self.security = security;
        self
    }

    pub fn with_database_url(mut self, url: Option<String>) -> Self {
        self.database_url = url;
        self
    }

    pub fn with_store(mut self, store: Arc<dyn DraftStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_draft_config(mut self, config: DraftConfig) -> Self {
        self.draft_config = config;
        self
    }

    pub fn with_identity(mut self, identity: Arc<dyn IdentityProvider>) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Replace the websocket hub as event sink (the hub still exists but
    /// receives nothing).
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub async fn build(self) -> Result<AppState, AppError> {
        let store: Arc<dyn DraftStore> = match (self.store, self.database_url) {
            (Some(store), _) => store,
            (None, Some(url)) => {
                info!(database = %sanitize_db_url(&url), "using sql draft store");
                Arc::new(SeaDraftStore::new(bootstrap_db(&url).await?))
            }
            (None, None) => Arc::new(MemoryDraftStore::new()),
        };

        let ws_hub = Arc::new(WsHub::new());
        let notifier: Arc<dyn Notifier> = match self.notifier {
            Some(notifier) => notifier,
            None => ws_hub.clone(),
        };
        let identity = self
            .identity
            .unwrap_or_else(|| Arc::new(RosterIdentityProvider::default()));

        let drafts = Arc::new(DraftRegistry::new(store, notifier, self.draft_config));
        Ok(AppState::new(self.security, drafts, ws_hub, identity))
    }
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_state() -> StateBuilder {
    StateBuilder::new()
}
