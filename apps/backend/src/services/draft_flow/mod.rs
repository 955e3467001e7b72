//! Live draft coordination.
//!
//! `DraftRegistry` owns one `DraftSession` per draft id. Every change to a
//! draft runs as a single unit under that session's lock, so player
//! submissions and timer expiry never interleave. Sessions only live while
//! someone is seated in an unfinished draft; idle ones are evicted and
//! reloaded from the store on demand.

mod session;
mod timer;

#[cfg(test)]
mod tests_flow;
#[cfg(test)]
mod tests_timeouts;

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use lazy_regex::regex_is_match;
use tracing::{debug, info};

pub use session::{DraftSession, DraftTransition};
pub use timer::{display_seconds, TurnTimer};

use crate::config::draft::DraftConfig;
use crate::domain::snapshot::DraftSnapshot;
use crate::domain::state::Draft;
use crate::errors::domain::{DomainError, NotFoundKind, ValidationKind};
use crate::repos::drafts::DraftStore;
use crate::services::notifier::Notifier;

/// Draft ids are path segments: 1-64 chars of `[A-Za-z0-9_-]`.
pub fn validate_draft_id(draft_id: &str) -> Result<(), DomainError> {
    if regex_is_match!(r"^[A-Za-z0-9_-]{1,64}$", draft_id) {
        Ok(())
    } else {
        Err(DomainError::validation(
            ValidationKind::InvalidDraftId,
            format!("invalid draft id '{draft_id}'"),
        ))
    }
}

pub struct DraftRegistry {
    sessions: DashMap<String, Arc<DraftSession>>,
    store: Arc<dyn DraftStore>,
    notifier: Arc<dyn Notifier>,
    config: DraftConfig,
}

impl DraftRegistry {
    pub fn new(store: Arc<dyn DraftStore>, notifier: Arc<dyn Notifier>, config: DraftConfig) -> Self {
        Self {
            sessions: DashMap::new(),
            store,
            notifier,
            config,
        }
    }

    pub fn config(&self) -> DraftConfig {
        self.config
    }

    pub fn store_kind(&self) -> &'static str {
        self.store.kind()
    }

    /// Number of drafts with a live session in this process.
    pub fn live_sessions(&self) -> usize {
        self.sessions.len()
    }

    /// Session for `draft_id`, creating an empty draft when none exists.
    /// A created draft is only persisted by its first accepted change.
    pub async fn open(&self, draft_id: &str) -> Result<Arc<DraftSession>, DomainError> {
        self.get_or_load(draft_id, true).await
    }

    /// Session for an existing draft; `NotFound` otherwise.
    pub async fn existing(&self, draft_id: &str) -> Result<Arc<DraftSession>, DomainError> {
        self.get_or_load(draft_id, false).await
    }

    /// Current snapshot without creating a session for drafts that are not
    /// running. An unknown draft reads as a fresh, empty one.
    pub async fn snapshot(&self, draft_id: &str) -> Result<DraftSnapshot, DomainError> {
        validate_draft_id(draft_id)?;
        if let Some(session) = self.live(draft_id) {
            return Ok(session.snapshot().await);
        }
        match self.store.load(draft_id).await? {
            // An unfinished turn needs its timer back.
            Some(draft) if draft.pending_turn().is_some() => {
                Ok(self.existing(draft_id).await?.snapshot().await)
            }
            Some(draft) => Ok(DraftSnapshot::of(draft_id, &draft)),
            None => Ok(DraftSnapshot::of(draft_id, &Draft::new())),
        }
    }

    /// Hand back a session after use, evicting it when idle.
    pub fn release(&self, session: Arc<DraftSession>) {
        let draft_id = session.draft_id().to_string();
        drop(session);
        if self
            .sessions
            .remove_if(&draft_id, |_, s| Arc::strong_count(s) == 1 && s.is_idle())
            .is_some()
        {
            debug!(draft_id = %draft_id, "idle draft session evicted");
        }
    }

    /// Evict every idle session nobody else holds. Returns how many went.
    pub fn sweep(&self) -> usize {
        let before = self.sessions.len();
        self.sessions
            .retain(|_, s| !(Arc::strong_count(s) == 1 && s.is_idle()));
        let evicted = before.saturating_sub(self.sessions.len());
        if evicted > 0 {
            debug!(evicted, "idle draft sessions swept");
        }
        evicted
    }

    fn live(&self, draft_id: &str) -> Option<Arc<DraftSession>> {
        self.sessions.get(draft_id).map(|s| Arc::clone(s.value()))
    }

    async fn get_or_load(&self, draft_id: &str, create: bool) -> Result<Arc<DraftSession>, DomainError> {
        validate_draft_id(draft_id)?;
        if let Some(session) = self.live(draft_id) {
            return Ok(session);
        }

        // Load outside any map guard; a concurrent loader may win the insert.
        let loaded = self.store.load(draft_id).await?;
        let from_store = loaded.is_some();
        let draft = match loaded {
            Some(draft) => draft,
            None if create => Draft::new(),
            None => {
                return Err(DomainError::not_found(
                    NotFoundKind::Draft,
                    format!("draft '{draft_id}' not found"),
                ))
            }
        };

        self.sweep();
        let (session, inserted) = match self.sessions.entry(draft_id.to_string()) {
            Entry::Occupied(existing) => (Arc::clone(existing.get()), false),
            Entry::Vacant(slot) => {
                let session = Arc::new(DraftSession::new(
                    draft_id.to_string(),
                    draft,
                    Arc::clone(&self.store),
                    Arc::clone(&self.notifier),
                    self.config,
                ));
                slot.insert(Arc::clone(&session));
                (session, true)
            }
        };

        if inserted {
            if from_store {
                info!(draft_id, "draft loaded from store");
                session.resume().await;
            } else {
                debug!(draft_id, "new draft opened");
            }
        }
        Ok(session)
    }
}
