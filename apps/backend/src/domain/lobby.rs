//! Lobby operations: participants, quotas, candidate pool, readiness, start
//! and reset. Every function mutates `&mut Draft` in place and leaves it
//! unchanged on error.

use lazy_regex::regex_is_match;

use crate::domain::sequencer;
use crate::domain::state::{Draft, DraftStage, ItemId, Participant, Quotas, Side, MAX_QUOTA};
use crate::errors::domain::{AuthorizationKind, ConflictKind, DomainError, ValidationKind};

/// Result of the fair coin used to pick the first mover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoinFace {
    Heads,
    Tails,
}

impl CoinFace {
    /// Heads gives side A the first move.
    pub fn side(self) -> Side {
        match self {
            CoinFace::Heads => Side::A,
            CoinFace::Tails => Side::B,
        }
    }

    pub fn from_bool(heads: bool) -> Self {
        if heads {
            CoinFace::Heads
        } else {
            CoinFace::Tails
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveOutcome {
    Left,
    /// The last participant left and the draft was cleared.
    Emptied,
}

pub fn validate_item_id(item_id: &str) -> Result<(), DomainError> {
    if regex_is_match!(r"^[A-Za-z0-9][A-Za-z0-9 _.:\-]{0,63}$", item_id) {
        Ok(())
    } else {
        Err(DomainError::validation(
            ValidationKind::InvalidItemId,
            format!("invalid item id: {item_id:?}"),
        ))
    }
}

fn require_coordinator(side: Side) -> Result<(), DomainError> {
    if side == Side::COORDINATOR {
        Ok(())
    } else {
        Err(DomainError::authorization(
            AuthorizationKind::CoordinatorOnly,
            "only the coordinator may do this",
        ))
    }
}

fn require_stage(draft: &Draft, allowed: &[DraftStage]) -> Result<(), DomainError> {
    if allowed.contains(&draft.stage) {
        return Ok(());
    }
    if draft.is_completed() {
        return Err(DomainError::conflict(
            ConflictKind::SessionComplete,
            "draft is already completed",
        ));
    }
    Err(DomainError::conflict(
        ConflictKind::StageMismatch,
        format!("operation not allowed while {:?}", draft.stage),
    ))
}

/// Add `identity` for `side`. Re-joining with the same side is a no-op.
pub fn join(draft: &mut Draft, identity: &str, side: Side) -> Result<(), DomainError> {
    if let Some(existing) = draft.side_of(identity) {
        if existing == side {
            return Ok(());
        }
        return Err(DomainError::conflict(
            ConflictKind::SideTaken,
            format!("{identity} already holds side {existing}"),
        ));
    }
    if draft.participants.len() >= 2 {
        return Err(DomainError::conflict(
            ConflictKind::DraftFull,
            "draft already has two participants",
        ));
    }
    if let Some(other) = draft.occupant(side) {
        return Err(DomainError::conflict(
            ConflictKind::SideTaken,
            format!("side {side} is held by {}", other.identity),
        ));
    }
    draft.participants.push(Participant {
        identity: identity.to_string(),
        side,
    });
    Ok(())
}

pub fn leave(draft: &mut Draft, identity: &str) -> Result<LeaveOutcome, DomainError> {
    let before = draft.participants.len();
    draft.participants.retain(|p| p.identity != identity);
    if draft.participants.len() == before {
        return Err(DomainError::authorization(
            AuthorizationKind::UnknownParticipant,
            format!("{identity} is not a participant"),
        ));
    }
    if draft.participants.is_empty() {
        draft.reset();
        return Ok(LeaveOutcome::Emptied);
    }
    Ok(LeaveOutcome::Left)
}

pub fn configure_quotas(draft: &mut Draft, side: Side, quotas: Quotas) -> Result<(), DomainError> {
    require_coordinator(side)?;
    require_stage(draft, &[DraftStage::Configuring])?;
    if quotas.ban > MAX_QUOTA || quotas.pick > MAX_QUOTA {
        return Err(DomainError::validation(
            ValidationKind::InvalidQuota,
            format!("quotas must be at most {MAX_QUOTA}"),
        ));
    }
    draft.quotas = quotas;
    Ok(())
}

pub fn lock_quotas(draft: &mut Draft, side: Side) -> Result<(), DomainError> {
    require_coordinator(side)?;
    require_stage(draft, &[DraftStage::Configuring])?;
    draft.stage = DraftStage::Locked;
    Ok(())
}

pub fn add_candidate(draft: &mut Draft, side: Side, item_id: &str) -> Result<(), DomainError> {
    require_coordinator(side)?;
    require_stage(draft, &[DraftStage::Locked])?;
    validate_item_id(item_id)?;
    if draft.in_pool(item_id) {
        return Err(DomainError::conflict(
            ConflictKind::DuplicateCandidate,
            format!("{item_id} is already in the pool"),
        ));
    }
    draft.candidate_pool.push(ItemId::from(item_id));
    Ok(())
}

/// First ready flag moves the draft to `AwaitingReady` and freezes the pool,
/// so the pool must already cover every action.
pub fn mark_ready(draft: &mut Draft, side: Side) -> Result<(), DomainError> {
    require_stage(draft, &[DraftStage::Locked, DraftStage::AwaitingReady])?;
    require_full_pool(draft)?;
    if draft.readiness.get(side) {
        return Err(DomainError::conflict(
            ConflictKind::AlreadyReady,
            format!("side {side} is already ready"),
        ));
    }
    draft.readiness.set(side, true);
    draft.stage = DraftStage::AwaitingReady;
    Ok(())
}

/// Start the draft with the given coin result.
pub fn start(draft: &mut Draft, side: Side, coin: CoinFace) -> Result<Side, DomainError> {
    require_coordinator(side)?;
    require_stage(draft, &[DraftStage::AwaitingReady])?;
    if !draft.readiness.both() {
        return Err(DomainError::conflict(
            ConflictKind::NotAllReady,
            "both sides must be ready",
        ));
    }
    require_full_pool(draft)?;
    let first_mover = coin.side();
    sequencer::begin(draft, first_mover);
    Ok(first_mover)
}

fn require_full_pool(draft: &Draft) -> Result<(), DomainError> {
    let needed = draft.quotas.total_actions();
    if draft.candidate_pool.len() < needed {
        return Err(DomainError::validation(
            ValidationKind::PoolTooSmall,
            format!(
                "pool has {} items, {needed} required",
                draft.candidate_pool.len()
            ),
        ));
    }
    Ok(())
}

pub fn reset(draft: &mut Draft, side: Side) -> Result<(), DomainError> {
    require_coordinator(side)?;
    draft.reset();
    Ok(())
}
