//! Public snapshot API for observing a draft without exposing internals.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::state::{
    Action, ActionKind, Draft, DraftStage, ItemId, Participant, Quotas, Readiness, Side,
};

/// Full client-facing view of one draft.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftSnapshot {
    pub draft_id: String,
    pub version: u64,
    pub stage: DraftStage,
    pub participants: Vec<Participant>,
    pub candidate_pool: Vec<ItemId>,
    pub quotas: Quotas,
    pub total_actions: usize,
    pub history: Vec<Action>,
    pub first_mover: Option<Side>,
    pub turn_owner: Option<Side>,
    pub turn_kind: Option<ActionKind>,
    pub readiness: Readiness,
    pub completed: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub turn_deadline: Option<OffsetDateTime>,
}

impl DraftSnapshot {
    pub fn of(draft_id: &str, draft: &Draft) -> Self {
        let turn = draft.pending_turn();
        Self {
            draft_id: draft_id.to_string(),
            version: draft.version,
            stage: draft.stage,
            participants: draft.participants.clone(),
            candidate_pool: draft.candidate_pool.clone(),
            quotas: draft.quotas,
            total_actions: draft.quotas.total_actions(),
            history: draft.history.clone(),
            first_mover: draft.first_mover,
            turn_owner: turn.map(|t| t.owner),
            turn_kind: turn.map(|t| t.kind),
            readiness: draft.readiness,
            completed: draft.is_completed(),
            turn_deadline: draft.turn_deadline,
        }
    }
}
