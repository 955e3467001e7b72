//! Draft persistence: the `DraftStore` trait and its in-memory implementation.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::domain::state::Draft;
use crate::errors::domain::DomainError;

/// Durable home of drafts. Implementations must make `save` atomic per draft.
#[async_trait]
pub trait DraftStore: Send + Sync {
    async fn load(&self, draft_id: &str) -> Result<Option<Draft>, DomainError>;

    async fn save(&self, draft_id: &str, draft: &Draft) -> Result<(), DomainError>;

    /// Short label surfaced by the health endpoint.
    fn kind(&self) -> &'static str;
}

/// Process-local store; contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryDraftStore {
    drafts: DashMap<String, Draft>,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }
}

#[async_trait]
impl DraftStore for MemoryDraftStore {
    async fn load(&self, draft_id: &str) -> Result<Option<Draft>, DomainError> {
        Ok(self.drafts.get(draft_id).map(|d| d.value().clone()))
    }

    async fn save(&self, draft_id: &str, draft: &Draft) -> Result<(), DomainError> {
        self.drafts.insert(draft_id.to_string(), draft.clone());
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "memory"
    }
}
