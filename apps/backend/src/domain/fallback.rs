use rand::seq::IndexedRandom;
use rand::Rng;

use crate::domain::sequencer;
use crate::domain::state::{Action, Draft, ItemId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeoutOutcome {
    /// A random remaining item was applied for the expired turn.
    AutoResolved(Action),
    /// Nothing left to choose; the draft was completed.
    ForcedCompletion,
    /// No turn was pending.
    Idle,
}

/// Uniform choice from `candidate_pool \ history`.
pub fn choose_fallback<R: Rng + ?Sized>(draft: &Draft, rng: &mut R) -> Option<ItemId> {
    draft.remaining_items().choose(rng).map(|item| (*item).clone())
}

/// Resolve an expired turn as if its owner had submitted a random item.
pub fn resolve_timeout<R: Rng + ?Sized>(draft: &mut Draft, rng: &mut R) -> TimeoutOutcome {
    let Some(turn) = draft.pending_turn() else {
        return TimeoutOutcome::Idle;
    };
    let Some(item_id) = choose_fallback(draft, rng) else {
        sequencer::force_complete(draft);
        return TimeoutOutcome::ForcedCompletion;
    };
    let action = Action {
        item_id,
        side: turn.owner,
        kind: turn.kind,
    };
    match sequencer::advance(draft, action.clone()) {
        Ok(()) => TimeoutOutcome::AutoResolved(action),
        // Unreachable for a consistent draft; never loop on it.
        Err(_) => {
            sequencer::force_complete(draft);
            TimeoutOutcome::ForcedCompletion
        }
    }
}
