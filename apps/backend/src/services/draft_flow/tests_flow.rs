use std::sync::Arc;

use crate::domain::state::{ActionKind, DraftStage, Side};
use crate::domain::test_state_helpers::{ALICE, BOB};
use crate::errors::domain::{AuthorizationKind, ConflictKind, DomainError, NotFoundKind, ValidationKind};
use crate::services::draft_flow::test_fixtures::{
    harness, harness_with_store, ready_session, started_session, ticks, who, TURN_SECS,
};
use crate::services::draft_flow::validate_draft_id;
use crate::services::notifier::DraftEvent;

#[test]
fn draft_ids_are_path_safe() {
    assert!(validate_draft_id("scrim-42_b").is_ok());
    for bad in ["", "a/b", "has space", &"x".repeat(65)] {
        let err = validate_draft_id(bad).unwrap_err();
        assert!(matches!(err, DomainError::Validation(ValidationKind::InvalidDraftId, _)));
    }
}

#[tokio::test(start_paused = true)]
async fn existing_requires_a_known_draft_and_open_creates_lazily() {
    let h = harness();
    let err = h.registry.existing("nope").await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound(NotFoundKind::Draft, _)));

    let session = h.registry.open("d1").await.unwrap();
    assert_eq!(session.snapshot().await.version, 0);
    assert_eq!(h.store.saved(), 0, "opening must not persist");

    session.join(ALICE, Side::A).await.unwrap();
    assert_eq!(h.store.saved(), 1);

    // Same session object for every caller.
    let again = h.registry.existing("d1").await.unwrap();
    assert!(Arc::ptr_eq(&session, &again));
    assert_eq!(h.registry.live_sessions(), 1);
}

#[tokio::test(start_paused = true)]
async fn start_emits_coin_toss_then_state_then_first_tick() {
    let h = harness();
    let session = ready_session(&h, "d1", 2, 1, 8).await;
    h.events.clear();

    let snapshot = session.start(ALICE).await.unwrap();
    assert_eq!(snapshot.stage, DraftStage::InProgress);
    assert_eq!(snapshot.turn_kind, Some(ActionKind::Ban));
    assert_eq!(snapshot.turn_owner, snapshot.first_mover);
    assert!(snapshot.turn_deadline.is_some());

    assert_eq!(
        h.events.names(),
        vec!["coinTossResolved", "draftStateChanged", "turnTimerTick"]
    );
    let events = h.events.events();
    let DraftEvent::CoinTossResolved { face, first_mover, .. } = &events[0].1 else {
        panic!("expected coin toss first");
    };
    assert_eq!(face.side(), *first_mover);
    assert_eq!(Some(*first_mover), snapshot.first_mover);
    assert_eq!(ticks(&h.events), vec![TURN_SECS]);
    assert!(session.timer_armed().await);
}

#[tokio::test(start_paused = true)]
async fn full_draft_by_submissions_bumps_version_once_per_action() {
    let h = harness();
    let (session, first) = started_session(&h, "d1", 2, 1, 8).await;
    let mut version = session.snapshot().await.version;

    for i in 0..6 {
        let turn_side = if i % 2 == 0 { first } else { first.other() };
        let kind = if i < 4 { ActionKind::Ban } else { ActionKind::Pick };
        let snapshot = session
            .submit(who(turn_side), kind, &format!("item-{i}"), Some(version))
            .await
            .unwrap();
        assert_eq!(snapshot.version, version + 1);
        version = snapshot.version;
    }

    let snapshot = session.snapshot().await;
    assert!(snapshot.completed);
    assert_eq!(snapshot.history.len(), 6);
    assert_eq!(snapshot.turn_deadline, None);
    assert!(!session.timer_armed().await);
}

#[tokio::test(start_paused = true)]
async fn rejected_submission_changes_nothing_and_keeps_timer() {
    let h = harness();
    let (session, first) = started_session(&h, "d1", 1, 1, 4).await;
    let before = session.snapshot().await;
    h.events.clear();

    let err = session
        .submit(who(first.other()), ActionKind::Ban, "item-0", None)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict(ConflictKind::NotYourTurn, _)));

    let err = session
        .submit(who(first), ActionKind::Pick, "item-0", None)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict(ConflictKind::WrongActionKind, _)));

    let err = session
        .submit(who(first), ActionKind::Ban, "elsewhere", None)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(ValidationKind::NotInPool, _)));

    let err = session
        .submit("mallory", ActionKind::Ban, "item-0", None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Authorization(AuthorizationKind::UnknownParticipant, _)
    ));

    assert_eq!(session.snapshot().await, before);
    assert!(h.events.events().is_empty());
    assert!(session.timer_armed().await);
}

#[tokio::test(start_paused = true)]
async fn stale_expected_version_is_optimistic_lock_conflict() {
    let h = harness();
    let (session, first) = started_session(&h, "d1", 1, 0, 2).await;
    let version = session.snapshot().await.version;

    let err = session
        .submit(who(first), ActionKind::Ban, "item-0", Some(version - 1))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict(ConflictKind::OptimisticLock, _)));
    assert_eq!(session.snapshot().await.version, version);
}

#[tokio::test(start_paused = true)]
async fn resolved_item_cannot_be_submitted_again() {
    let h = harness();
    let (session, first) = started_session(&h, "d1", 2, 1, 8).await;
    session
        .submit(who(first), ActionKind::Ban, "item-3", None)
        .await
        .unwrap();
    let err = session
        .submit(who(first.other()), ActionKind::Ban, "item-3", None)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict(ConflictKind::AlreadyResolved, _)));
}

#[tokio::test(start_paused = true)]
async fn idempotent_join_does_not_bump_version_or_notify() {
    let h = harness();
    let session = h.registry.open("d1").await.unwrap();
    let first = session.join(ALICE, Side::A).await.unwrap();
    h.events.clear();

    let again = session.join(ALICE, Side::A).await.unwrap();
    assert_eq!(again.version, first.version);
    assert!(h.events.events().is_empty());
}

#[tokio::test(start_paused = true)]
async fn player_save_failure_is_reported_and_turn_stays_open() {
    let h = harness();
    let (session, first) = started_session(&h, "d1", 1, 1, 4).await;
    let before = session.snapshot().await;

    h.store.set_failing(true);
    let err = session
        .submit(who(first), ActionKind::Ban, "item-0", None)
        .await
        .unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(session.snapshot().await, before);
    assert!(session.timer_armed().await, "turn timer must be restored");

    h.store.set_failing(false);
    let snapshot = session
        .submit(who(first), ActionKind::Ban, "item-0", None)
        .await
        .unwrap();
    assert_eq!(snapshot.version, before.version + 1);
}

#[tokio::test(start_paused = true)]
async fn reset_returns_to_configuring_and_disarms() {
    let h = harness();
    let (session, _first) = started_session(&h, "d1", 1, 1, 4).await;

    let err = session.reset(BOB).await.unwrap_err();
    assert!(matches!(
        err,
        DomainError::Authorization(AuthorizationKind::CoordinatorOnly, _)
    ));

    let snapshot = session.reset(ALICE).await.unwrap();
    assert_eq!(snapshot.stage, DraftStage::Configuring);
    assert!(snapshot.history.is_empty());
    assert_eq!(snapshot.participants.len(), 2);
    assert!(!session.timer_armed().await);
}

#[tokio::test(start_paused = true)]
async fn last_leave_empties_the_draft() {
    let h = harness();
    let session = ready_session(&h, "d1", 1, 1, 4).await;
    session.leave(BOB).await.unwrap();
    let snapshot = session.leave(ALICE).await.unwrap();
    assert!(snapshot.participants.is_empty());
    assert_eq!(snapshot.stage, DraftStage::Configuring);
    assert!(snapshot.candidate_pool.is_empty());

    let err = session.leave(ALICE).await.unwrap_err();
    assert!(matches!(
        err,
        DomainError::Authorization(AuthorizationKind::UnknownParticipant, _)
    ));
}

#[tokio::test(start_paused = true)]
async fn zero_quotas_complete_on_start_without_timer() {
    let h = harness();
    let session = ready_session(&h, "d1", 0, 0, 0).await;
    let snapshot = session.start(ALICE).await.unwrap();
    assert!(snapshot.completed);
    assert!(!session.timer_armed().await);
    assert!(ticks(&h.events).is_empty());
}

#[tokio::test(start_paused = true)]
async fn concurrent_submissions_for_one_turn_accept_exactly_one() {
    let h = harness();
    let (session, first) = started_session(&h, "d1", 1, 1, 4).await;
    let version = session.snapshot().await.version;

    let (a, b) = tokio::join!(
        session.submit(who(first), ActionKind::Ban, "item-0", Some(version)),
        session.submit(who(first), ActionKind::Ban, "item-1", Some(version)),
    );
    let (accepted, rejected) = match (a, b) {
        (Ok(snapshot), Err(err)) | (Err(err), Ok(snapshot)) => (snapshot, err),
        other => panic!("expected exactly one acceptance, got {other:?}"),
    };
    assert!(matches!(rejected, DomainError::Conflict(ConflictKind::OptimisticLock, _)));
    assert_eq!(accepted.version, version + 1);

    let snapshot = session.snapshot().await;
    assert_eq!(snapshot.version, version + 1);
    assert_eq!(snapshot.history.len(), 1);

    // Without a version the loser is told the turn moved on.
    let owner = snapshot.turn_owner.unwrap();
    let (a, b) = tokio::join!(
        session.submit(who(owner), ActionKind::Ban, "item-2", None),
        session.submit(who(owner), ActionKind::Ban, "item-3", None),
    );
    assert_eq!(a.is_ok() as usize + b.is_ok() as usize, 1);
    let err = a.err().or(b.err()).unwrap();
    assert!(matches!(err, DomainError::Conflict(ConflictKind::NotYourTurn, _)));
    assert_eq!(session.snapshot().await.version, version + 2);
}

#[tokio::test(start_paused = true)]
async fn snapshot_reads_do_not_open_sessions() {
    let h = harness();
    for i in 0..50 {
        let snapshot = h.registry.snapshot(&format!("ghost-{i}")).await.unwrap();
        assert_eq!(snapshot.version, 0);
        assert!(snapshot.participants.is_empty());
    }
    assert_eq!(h.registry.live_sessions(), 0);
    assert_eq!(h.store.saved(), 0);

    let err = h.registry.snapshot("no/such").await.unwrap_err();
    assert!(matches!(err, DomainError::Validation(ValidationKind::InvalidDraftId, _)));

    let lobby = h.registry.open("lobby").await.unwrap();
    lobby.join(ALICE, Side::A).await.unwrap();
    let (_running, _first) = started_session(&h, "running", 1, 1, 4).await;

    // A second process over the same store.
    let other = harness_with_store(Arc::clone(&h.store));
    let snapshot = other.registry.snapshot("lobby").await.unwrap();
    assert_eq!(snapshot.version, 1);
    assert_eq!(snapshot.participants.len(), 1);
    assert_eq!(other.registry.live_sessions(), 0);

    // A running turn comes back with its timer.
    let snapshot = other.registry.snapshot("running").await.unwrap();
    assert_eq!(snapshot.stage, DraftStage::InProgress);
    assert_eq!(other.registry.live_sessions(), 1);
    assert!(other.registry.existing("running").await.unwrap().timer_armed().await);
}

#[tokio::test(start_paused = true)]
async fn released_sessions_are_evicted_once_idle() {
    let h = harness();
    let session = h.registry.open("d1").await.unwrap();
    session.join(ALICE, Side::A).await.unwrap();
    h.registry.release(session);
    assert_eq!(h.registry.live_sessions(), 1, "a seated draft stays live");

    let session = h.registry.existing("d1").await.unwrap();
    let held = Arc::clone(&session);
    session.leave(ALICE).await.unwrap();
    h.registry.release(session);
    assert_eq!(h.registry.live_sessions(), 1, "a held session stays live");
    h.registry.release(held);
    assert_eq!(h.registry.live_sessions(), 0);

    // The emptied draft reloads from the store as it was left.
    let reloaded = h.registry.existing("d1").await.unwrap();
    let snapshot = reloaded.snapshot().await;
    assert_eq!(snapshot.version, 2);
    assert!(snapshot.participants.is_empty());
    h.registry.release(reloaded);

    // Completion also frees the session.
    let session = ready_session(&h, "d2", 0, 0, 0).await;
    assert!(session.start(ALICE).await.unwrap().completed);
    h.registry.release(session);
    assert_eq!(h.registry.live_sessions(), 0);
    assert!(h.registry.snapshot("d2").await.unwrap().completed);
    assert_eq!(h.registry.live_sessions(), 0);
}

#[tokio::test(start_paused = true)]
async fn sweep_drops_abandoned_opens_but_keeps_running_drafts() {
    let h = harness();
    let (running, _first) = started_session(&h, "running", 1, 1, 4).await;
    for id in ["a", "b", "c"] {
        // A failed join leaves nothing seated.
        let session = h.registry.open(id).await.unwrap();
        assert!(session.leave(ALICE).await.is_err());
    }
    // Each open sweeps the abandoned one before it.
    assert_eq!(h.registry.live_sessions(), 2);
    assert_eq!(h.registry.sweep(), 1);
    assert_eq!(h.registry.live_sessions(), 1);

    drop(running);
    assert_eq!(h.registry.sweep(), 0, "an armed turn keeps its session");
    assert_eq!(h.registry.live_sessions(), 1);
}
