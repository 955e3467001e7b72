use crate::domain::lobby::{
    add_candidate, configure_quotas, join, leave, lock_quotas, mark_ready, reset, start, CoinFace,
    LeaveOutcome,
};
use crate::domain::state::{ActionKind, Draft, DraftStage, Quotas, Side, Turn, MAX_QUOTA};
use crate::domain::test_state_helpers::lobby_draft;
use crate::errors::domain::{AuthorizationKind, ConflictKind, DomainError, ValidationKind};

fn conflict_kind(err: DomainError) -> ConflictKind {
    match err {
        DomainError::Conflict(kind, _) => kind,
        other => panic!("expected conflict, got {other}"),
    }
}

/// Configured, locked, pool filled with `n` items, nobody ready.
fn locked_with_pool(ban: u32, pick: u32, n: usize) -> Draft {
    let mut draft = lobby_draft();
    configure_quotas(&mut draft, Side::A, Quotas::new(ban, pick)).unwrap();
    lock_quotas(&mut draft, Side::A).unwrap();
    for i in 0..n {
        add_candidate(&mut draft, Side::A, &format!("map-{i}")).unwrap();
    }
    draft
}

#[test]
fn join_assigns_sides_and_caps_at_two() {
    let mut draft = Draft::new();
    join(&mut draft, "alice", Side::A).unwrap();
    join(&mut draft, "alice", Side::A).unwrap();
    assert_eq!(draft.participants.len(), 1);

    let err = join(&mut draft, "carol", Side::A).unwrap_err();
    assert_eq!(conflict_kind(err), ConflictKind::SideTaken);

    join(&mut draft, "bob", Side::B).unwrap();
    let err = join(&mut draft, "carol", Side::B).unwrap_err();
    assert_eq!(conflict_kind(err), ConflictKind::DraftFull);
}

#[test]
fn last_leave_resets_draft() {
    let mut draft = locked_with_pool(1, 1, 4);
    assert_eq!(leave(&mut draft, "alice").unwrap(), LeaveOutcome::Left);
    assert_eq!(draft.stage, DraftStage::Locked);
    assert_eq!(leave(&mut draft, "bob").unwrap(), LeaveOutcome::Emptied);
    assert_eq!(draft.stage, DraftStage::Configuring);
    assert!(draft.candidate_pool.is_empty());
    assert!(draft.participants.is_empty());

    let err = leave(&mut draft, "bob").unwrap_err();
    assert!(matches!(
        err,
        DomainError::Authorization(AuthorizationKind::UnknownParticipant, _)
    ));
}

#[test]
fn only_coordinator_configures() {
    let mut draft = lobby_draft();
    let err = configure_quotas(&mut draft, Side::B, Quotas::new(1, 1)).unwrap_err();
    assert!(matches!(
        err,
        DomainError::Authorization(AuthorizationKind::CoordinatorOnly, _)
    ));

    let err = configure_quotas(&mut draft, Side::A, Quotas::new(MAX_QUOTA + 1, 0)).unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationKind::InvalidQuota, _)
    ));
}

#[test]
fn quotas_frozen_after_lock() {
    let mut draft = locked_with_pool(1, 1, 0);
    let err = configure_quotas(&mut draft, Side::A, Quotas::new(2, 2)).unwrap_err();
    assert_eq!(conflict_kind(err), ConflictKind::StageMismatch);
    assert_eq!(draft.quotas, Quotas::new(1, 1));
}

#[test]
fn candidates_require_lock_and_reject_duplicates() {
    let mut draft = lobby_draft();
    let err = add_candidate(&mut draft, Side::A, "dust").unwrap_err();
    assert_eq!(conflict_kind(err), ConflictKind::StageMismatch);

    let mut draft = locked_with_pool(1, 1, 1);
    let err = add_candidate(&mut draft, Side::A, "map-0").unwrap_err();
    assert_eq!(conflict_kind(err), ConflictKind::DuplicateCandidate);

    let err = add_candidate(&mut draft, Side::A, "   ").unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationKind::InvalidItemId, _)
    ));
}

#[test]
fn first_ready_freezes_pool() {
    let mut draft = locked_with_pool(1, 1, 4);
    mark_ready(&mut draft, Side::B).unwrap();
    assert_eq!(draft.stage, DraftStage::AwaitingReady);

    let err = add_candidate(&mut draft, Side::A, "late").unwrap_err();
    assert_eq!(conflict_kind(err), ConflictKind::StageMismatch);

    let err = mark_ready(&mut draft, Side::B).unwrap_err();
    assert_eq!(conflict_kind(err), ConflictKind::AlreadyReady);
}

#[test]
fn start_requires_both_ready() {
    let mut draft = locked_with_pool(2, 1, 6);
    mark_ready(&mut draft, Side::A).unwrap();
    let err = start(&mut draft, Side::A, CoinFace::Heads).unwrap_err();
    assert_eq!(conflict_kind(err), ConflictKind::NotAllReady);

    mark_ready(&mut draft, Side::B).unwrap();
    start(&mut draft, Side::A, CoinFace::Heads).unwrap();
    assert_eq!(draft.stage, DraftStage::InProgress);
}

#[test]
fn ready_is_refused_until_the_pool_covers_every_action() {
    let mut draft = locked_with_pool(2, 1, 5);
    let err = mark_ready(&mut draft, Side::B).unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationKind::PoolTooSmall, _)
    ));
    assert_eq!(draft.stage, DraftStage::Locked);
    assert!(!draft.readiness.get(Side::B));

    // The coordinator can still grow the pool, then readiness goes through.
    add_candidate(&mut draft, Side::A, "late").unwrap();
    mark_ready(&mut draft, Side::B).unwrap();
    assert_eq!(draft.stage, DraftStage::AwaitingReady);
}

#[test]
fn start_rechecks_pool_size() {
    let mut draft = locked_with_pool(1, 1, 4);
    draft.readiness.set(Side::A, true);
    draft.readiness.set(Side::B, true);
    draft.stage = DraftStage::AwaitingReady;
    draft.candidate_pool.truncate(3);
    let err = start(&mut draft, Side::A, CoinFace::Heads).unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationKind::PoolTooSmall, _)
    ));
    assert_eq!(draft.stage, DraftStage::AwaitingReady);
}

#[test]
fn start_tosses_coin_and_sets_first_turn() {
    let mut draft = locked_with_pool(1, 1, 4);
    mark_ready(&mut draft, Side::A).unwrap();
    mark_ready(&mut draft, Side::B).unwrap();

    let err = start(&mut draft, Side::B, CoinFace::Heads).unwrap_err();
    assert!(matches!(
        err,
        DomainError::Authorization(AuthorizationKind::CoordinatorOnly, _)
    ));

    let first = start(&mut draft, Side::A, CoinFace::Tails).unwrap();
    assert_eq!(first, Side::B);
    assert_eq!(draft.first_mover, Some(Side::B));
    assert_eq!(draft.stage, DraftStage::InProgress);
    assert_eq!(
        draft.pending_turn(),
        Some(Turn {
            owner: Side::B,
            kind: ActionKind::Ban
        })
    );
}

#[test]
fn start_with_zero_quotas_completes() {
    let mut draft = locked_with_pool(0, 0, 0);
    mark_ready(&mut draft, Side::A).unwrap();
    mark_ready(&mut draft, Side::B).unwrap();
    start(&mut draft, Side::A, CoinFace::Heads).unwrap();
    assert!(draft.is_completed());
    assert!(draft.history.is_empty());
}

#[test]
fn reset_keeps_participants_and_version() {
    let mut draft = locked_with_pool(1, 1, 4);
    draft.version = 9;
    reset(&mut draft, Side::A).unwrap();
    assert_eq!(draft.participants.len(), 2);
    assert_eq!(draft.version, 9);
    assert_eq!(draft.stage, DraftStage::Configuring);
    assert_eq!(draft.quotas, Quotas::default());
    assert!(draft.candidate_pool.is_empty());
}
