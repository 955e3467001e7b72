//! Outbound draft events and the publishing seam.

use parking_lot::Mutex;
use serde::Serialize;
use tracing::debug;

use crate::domain::lobby::CoinFace;
use crate::domain::snapshot::DraftSnapshot;
use crate::domain::state::{ActionKind, ItemId, Side};

/// Everything a subscriber can observe about a draft.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum DraftEvent {
    #[serde(rename_all = "camelCase")]
    DraftStateChanged { snapshot: DraftSnapshot },
    #[serde(rename_all = "camelCase")]
    TurnTimerTick {
        draft_id: String,
        version: u64,
        remaining_seconds: u64,
        kind: ActionKind,
        side: Side,
    },
    #[serde(rename_all = "camelCase")]
    TurnAutoResolved {
        item_id: ItemId,
        kind: ActionKind,
        side: Side,
        snapshot: DraftSnapshot,
    },
    #[serde(rename_all = "camelCase")]
    CoinTossResolved {
        draft_id: String,
        first_mover: Side,
        face: CoinFace,
    },
}

impl DraftEvent {
    pub fn name(&self) -> &'static str {
        match self {
            DraftEvent::DraftStateChanged { .. } => "draftStateChanged",
            DraftEvent::TurnTimerTick { .. } => "turnTimerTick",
            DraftEvent::TurnAutoResolved { .. } => "turnAutoResolved",
            DraftEvent::CoinTossResolved { .. } => "coinTossResolved",
        }
    }

    /// Draft version the event describes, where it carries one.
    pub fn version(&self) -> Option<u64> {
        match self {
            DraftEvent::DraftStateChanged { snapshot } => Some(snapshot.version),
            DraftEvent::TurnAutoResolved { snapshot, .. } => Some(snapshot.version),
            DraftEvent::TurnTimerTick { version, .. } => Some(*version),
            DraftEvent::CoinTossResolved { .. } => None,
        }
    }
}

/// Fire-and-forget fan-out. Must not block; delivery is best effort.
pub trait Notifier: Send + Sync {
    fn publish(&self, draft_id: &str, event: DraftEvent);
}

/// Drops every event. Used when nothing subscribes (CLI tools, some tests).
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn publish(&self, draft_id: &str, event: DraftEvent) {
        debug!(draft_id, event = event.name(), "event dropped (no subscribers)");
    }
}

/// Keeps every published event in memory for later inspection.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<(String, DraftEvent)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(String, DraftEvent)> {
        self.events.lock().clone()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.events.lock().iter().map(|(_, e)| e.name()).collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl Notifier for RecordingNotifier {
    fn publish(&self, draft_id: &str, event: DraftEvent) {
        self.events.lock().push((draft_id.to_string(), event));
    }
}
