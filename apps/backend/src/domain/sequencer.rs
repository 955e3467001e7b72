//! Turn sequencing: the single place that knows the ban/pick phase arithmetic.
//!
//! Turn order for a draft is fully determined by the first mover and the
//! quotas. All ban turns (both sides) come first, then all pick turns. Inside a
//! phase, ownership alternates starting with the first mover.

use crate::domain::gateway::RejectionReason;
use crate::domain::state::{Action, ActionKind, Draft, DraftStage, Quotas, Side, Turn};

/// Turn for the action at `index` (0-based history position), or `None` once
/// `index` reaches the total action count.
pub fn turn_at(index: usize, first_mover: Side, quotas: Quotas) -> Option<Turn> {
    if index >= quotas.total_actions() {
        return None;
    }
    let boundary = quotas.ban_boundary();
    let (kind, offset) = if index < boundary {
        (ActionKind::Ban, index)
    } else {
        (ActionKind::Pick, index - boundary)
    };
    let owner = if offset % 2 == 0 {
        first_mover
    } else {
        first_mover.other()
    };
    Some(Turn { owner, kind })
}

/// Set the first mover and the turn for index 0.
///
/// Zero quotas complete the draft immediately.
pub fn begin(draft: &mut Draft, first_mover: Side) {
    draft.first_mover = Some(first_mover);
    draft.history.clear();
    draft.turn = turn_at(0, first_mover, draft.quotas);
    draft.stage = if draft.turn.is_some() {
        DraftStage::InProgress
    } else {
        DraftStage::Completed
    };
}

/// Turn-level preconditions shared by player submissions and the fallback.
pub fn check(draft: &Draft, action: &Action) -> Result<(), RejectionReason> {
    if draft.is_completed() {
        return Err(RejectionReason::SessionComplete);
    }
    let Some(turn) = draft.pending_turn() else {
        // Not started yet: nobody owns a turn.
        return Err(RejectionReason::NotYourTurn);
    };
    if turn.owner != action.side {
        return Err(RejectionReason::NotYourTurn);
    }
    if turn.kind != action.kind {
        return Err(RejectionReason::WrongActionKind);
    }
    if draft.is_resolved(&action.item_id) {
        return Err(RejectionReason::AlreadyResolved);
    }
    if !draft.in_pool(&action.item_id) {
        return Err(RejectionReason::NotInPool);
    }
    Ok(())
}

/// Apply one action. Rejections leave `draft` untouched.
pub fn advance(draft: &mut Draft, action: Action) -> Result<(), RejectionReason> {
    check(draft, &action)?;
    let first_mover = draft.first_mover.unwrap_or(Side::COORDINATOR);

    draft.history.push(action);
    let n = draft.history.len();
    draft.turn = turn_at(n, first_mover, draft.quotas);
    if draft.turn.is_none() {
        draft.stage = DraftStage::Completed;
        draft.turn_deadline = None;
    }
    Ok(())
}

/// End the draft without further actions (fallback found nothing to choose).
pub fn force_complete(draft: &mut Draft) {
    draft.turn = None;
    draft.turn_deadline = None;
    draft.stage = DraftStage::Completed;
}
