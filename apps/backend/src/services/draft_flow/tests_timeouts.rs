//! Timer-driven behaviour, run on tokio's paused clock.

use std::sync::Arc;
use std::time::Duration;

use time::OffsetDateTime;
use tokio::time::sleep;

use crate::domain::state::{ActionKind, Side};
use crate::domain::test_state_helpers::started_draft;
use crate::errors::domain::{ConflictKind, DomainError};
use crate::repos::drafts::DraftStore;
use crate::services::draft_flow::test_fixtures::{
    harness, harness_with_store, started_session, ticks, who, FlakyStore, TURN_SECS,
};
use crate::services::notifier::DraftEvent;

fn secs(s: u64) -> Duration {
    Duration::from_secs(s)
}

#[tokio::test(start_paused = true)]
async fn expired_turn_is_auto_resolved_after_full_countdown() {
    let h = harness();
    let (session, first) = started_session(&h, "d1", 2, 1, 8).await;
    let start_version = session.snapshot().await.version;
    h.events.clear();

    sleep(secs(TURN_SECS) + Duration::from_millis(100)).await;

    let snapshot = session.snapshot().await;
    assert_eq!(snapshot.history.len(), 1);
    assert_eq!(snapshot.history[0].side, first);
    assert_eq!(snapshot.history[0].kind, ActionKind::Ban);
    assert_eq!(snapshot.version, start_version + 1);
    assert_eq!(snapshot.turn_owner, Some(first.other()));

    let mut expected_ticks: Vec<u64> = (1..TURN_SECS).rev().collect();
    expected_ticks.push(TURN_SECS);
    assert_eq!(ticks(&h.events), expected_ticks);

    let names = h.events.names();
    assert_eq!(
        names[names.len() - 3..].to_vec(),
        vec!["turnAutoResolved", "draftStateChanged", "turnTimerTick"]
    );

    let events = h.events.events();
    let resolved = events
        .iter()
        .find_map(|(_, e)| match e {
            DraftEvent::TurnAutoResolved { item_id, side, snapshot, .. } => {
                Some((item_id.clone(), *side, snapshot.version))
            }
            _ => None,
        })
        .unwrap();
    assert_eq!(resolved.0, snapshot.history[0].item_id);
    assert_eq!(resolved.1, first);
    assert_eq!(resolved.2, snapshot.version);
}

#[tokio::test(start_paused = true)]
async fn submission_before_deadline_cancels_the_fallback() {
    let h = harness();
    let (session, first) = started_session(&h, "d1", 1, 1, 4).await;

    sleep(secs(TURN_SECS - 1)).await;
    session
        .submit(who(first), ActionKind::Ban, "item-2", None)
        .await
        .unwrap();

    // Past the first deadline but inside the second turn.
    sleep(secs(5)).await;
    let snapshot = session.snapshot().await;
    assert_eq!(snapshot.history.len(), 1);
    assert_eq!(snapshot.history[0].item_id, "item-2");
    assert!(!h.events.names().contains(&"turnAutoResolved"));
}

#[tokio::test(start_paused = true)]
async fn late_submission_after_fallback_is_rejected() {
    let h = harness();
    let (session, first) = started_session(&h, "d1", 2, 1, 8).await;

    sleep(secs(TURN_SECS) + Duration::from_millis(10)).await;
    let version = session.snapshot().await.version;

    let err = session
        .submit(who(first), ActionKind::Ban, "item-7", None)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict(ConflictKind::NotYourTurn, _)));
    assert_eq!(session.snapshot().await.version, version);
}

#[tokio::test(start_paused = true)]
async fn idle_draft_runs_to_completion_on_timeouts_alone() {
    let h = harness();
    let (session, _first) = started_session(&h, "d1", 1, 1, 4).await;

    sleep(secs(4 * TURN_SECS) + secs(1)).await;

    let snapshot = session.snapshot().await;
    assert!(snapshot.completed);
    assert_eq!(snapshot.history.len(), 4);
    assert!(!session.timer_armed().await);

    let mut items: Vec<_> = snapshot.history.iter().map(|a| a.item_id.clone()).collect();
    items.sort();
    items.dedup();
    assert_eq!(items.len(), 4);
}

#[tokio::test(start_paused = true)]
async fn timer_save_failure_leaves_draft_unchanged_and_unarmed() {
    let h = harness();
    let (session, _first) = started_session(&h, "d1", 1, 1, 4).await;
    let before = session.snapshot().await;

    h.store.set_failing(true);
    sleep(secs(TURN_SECS) + secs(1)).await;

    assert_eq!(session.snapshot().await, before);
    assert!(!session.timer_armed().await);
    assert!(!h.events.names().contains(&"turnAutoResolved"));

    // A player action after recovery re-arms.
    h.store.set_failing(false);
    let first = before.turn_owner.unwrap();
    session
        .submit(who(first), ActionKind::Ban, "item-0", None)
        .await
        .unwrap();
    assert!(session.timer_armed().await);
}

#[tokio::test(start_paused = true)]
async fn loaded_draft_resumes_remaining_time() {
    let store = Arc::new(FlakyStore::default());
    let mut draft = started_draft(1, 1, 4, Side::B);
    draft.version = 9;
    draft.turn_deadline = Some(OffsetDateTime::now_utc() + secs(5));
    store.save("d1", &draft).await.unwrap();

    let h = harness_with_store(store);
    let session = h.registry.existing("d1").await.unwrap();
    assert!(session.timer_armed().await);

    let first_tick = ticks(&h.events)[0];
    assert!(first_tick <= 5 && first_tick >= 4, "got {first_tick}");

    sleep(secs(6)).await;
    let snapshot = session.snapshot().await;
    assert_eq!(snapshot.version, 10);
    assert_eq!(snapshot.history.len(), 1);
    assert_eq!(snapshot.history[0].side, Side::B);
}

#[tokio::test(start_paused = true)]
async fn loaded_draft_past_deadline_resolves_immediately() {
    let store = Arc::new(FlakyStore::default());
    let mut draft = started_draft(1, 0, 2, Side::A);
    draft.turn_deadline = Some(OffsetDateTime::now_utc() - secs(60));
    store.save("d1", &draft).await.unwrap();

    let h = harness_with_store(store);
    let session = h.registry.existing("d1").await.unwrap();
    sleep(Duration::from_millis(1)).await;

    let snapshot = session.snapshot().await;
    assert_eq!(snapshot.history.len(), 1);
    assert_eq!(snapshot.history[0].side, Side::A);
}

#[tokio::test(start_paused = true)]
async fn completed_draft_loads_without_timer() {
    let store = Arc::new(FlakyStore::default());
    let draft = started_draft(0, 0, 0, Side::A);
    store.save("d1", &draft).await.unwrap();

    let h = harness_with_store(store);
    let session = h.registry.existing("d1").await.unwrap();
    assert!(!session.timer_armed().await);
    assert!(h.events.events().is_empty());
}

#[tokio::test(start_paused = true)]
async fn stale_fire_is_ignored() {
    let h = harness();
    let (session, first) = started_session(&h, "d1", 2, 0, 4).await;
    let armed_at = session.snapshot().await.version;

    session
        .submit(who(first), ActionKind::Ban, "item-0", None)
        .await
        .unwrap();
    let current = session.snapshot().await;

    // A fire for the superseded turn must not touch the draft.
    Arc::clone(&session).handle_timeout(armed_at).await;
    assert_eq!(session.snapshot().await, current);
    assert!(session.timer_armed().await);
}

#[tokio::test(start_paused = true)]
async fn lobby_churn_mid_turn_keeps_the_countdown() {
    let h = harness();
    let (session, first) = started_session(&h, "d1", 1, 1, 4).await;
    let idle = first.other();
    let deadline = session.snapshot().await.turn_deadline;
    assert!(deadline.is_some());

    // Leaving and rejoining every 14s must not push the deadline out.
    for _ in 0..2 {
        sleep(secs(TURN_SECS / 2 - 1)).await;
        session.leave(who(idle)).await.unwrap();
        session.join(who(idle), idle).await.unwrap();
        let snapshot = session.snapshot().await;
        assert!(snapshot.history.is_empty());
        assert_eq!(snapshot.turn_deadline, deadline);
        assert!(session.timer_armed().await);
    }

    sleep(secs(2) + Duration::from_millis(100)).await;
    let snapshot = session.snapshot().await;
    assert_eq!(snapshot.history.len(), 1);
    assert_eq!(snapshot.history[0].side, first);
    assert_eq!(snapshot.turn_owner, Some(idle));
}

#[tokio::test(start_paused = true)]
async fn submission_racing_the_deadline_appends_once() {
    let h = harness();
    let (session, first) = started_session(&h, "d1", 1, 1, 4).await;
    let version = session.snapshot().await.version;
    h.events.clear();

    sleep(secs(TURN_SECS)).await;
    let (submitted, ()) = tokio::join!(
        session.submit(who(first), ActionKind::Ban, "item-0", Some(version)),
        Arc::clone(&session).handle_timeout(version),
    );
    sleep(Duration::from_millis(100)).await;

    let snapshot = session.snapshot().await;
    assert_eq!(snapshot.history.len(), 1);
    assert_eq!(snapshot.history[0].side, first);
    assert_eq!(snapshot.version, version + 1);
    assert_eq!(snapshot.turn_owner, Some(first.other()));
    assert!(session.timer_armed().await);

    let auto_resolved = h
        .events
        .names()
        .into_iter()
        .filter(|name| *name == "turnAutoResolved")
        .count();
    match submitted {
        Ok(_) => {
            assert_eq!(snapshot.history[0].item_id, "item-0");
            assert_eq!(auto_resolved, 0);
        }
        Err(err) => {
            assert!(matches!(err, DomainError::Conflict(ConflictKind::OptimisticLock, _)));
            assert_eq!(auto_resolved, 1);
        }
    }
}
