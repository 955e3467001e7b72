use std::fmt;

use crate::domain::sequencer;
use crate::domain::state::{Action, ActionKind, Draft, ItemId};
use crate::errors::domain::{AuthorizationKind, ConflictKind, DomainError, ValidationKind};

/// Why a submission was refused. Rejections never mutate the draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    UnknownParticipant,
    SessionComplete,
    NotYourTurn,
    WrongActionKind,
    AlreadyResolved,
    NotInPool,
}

impl RejectionReason {
    pub fn describe(self) -> &'static str {
        match self {
            RejectionReason::UnknownParticipant => "caller is not a participant of this draft",
            RejectionReason::SessionComplete => "draft is already completed",
            RejectionReason::NotYourTurn => "it is not your turn",
            RejectionReason::WrongActionKind => "current turn expects a different action",
            RejectionReason::AlreadyResolved => "item has already been banned or picked",
            RejectionReason::NotInPool => "item is not in the candidate pool",
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

impl From<RejectionReason> for DomainError {
    fn from(reason: RejectionReason) -> Self {
        let detail = reason.describe();
        match reason {
            RejectionReason::UnknownParticipant => {
                DomainError::authorization(AuthorizationKind::UnknownParticipant, detail)
            }
            RejectionReason::SessionComplete => {
                DomainError::conflict(ConflictKind::SessionComplete, detail)
            }
            RejectionReason::NotYourTurn => DomainError::conflict(ConflictKind::NotYourTurn, detail),
            RejectionReason::WrongActionKind => {
                DomainError::conflict(ConflictKind::WrongActionKind, detail)
            }
            RejectionReason::AlreadyResolved => {
                DomainError::conflict(ConflictKind::AlreadyResolved, detail)
            }
            RejectionReason::NotInPool => DomainError::validation(ValidationKind::NotInPool, detail),
        }
    }
}

/// Resolve the caller's side and build the action it asks for.
pub fn validate(
    draft: &Draft,
    identity: &str,
    kind: ActionKind,
    item_id: &str,
) -> Result<Action, RejectionReason> {
    let side = draft
        .side_of(identity)
        .ok_or(RejectionReason::UnknownParticipant)?;
    let action = Action {
        item_id: ItemId::from(item_id),
        side,
        kind,
    };
    sequencer::check(draft, &action)?;
    Ok(action)
}

/// Validate and apply a player submission, returning the next draft.
///
/// Pure: the caller owns locking, timers and persistence.
pub fn submit(
    draft: &Draft,
    identity: &str,
    kind: ActionKind,
    item_id: &str,
) -> Result<Draft, RejectionReason> {
    let action = validate(draft, identity, kind, item_id)?;
    let mut next = draft.clone();
    sequencer::advance(&mut next, action)?;
    Ok(next)
}
