//! One live draft: its lock, its timer and the unit of work every change
//! goes through.

use std::sync::Arc;

use futures::future::BoxFuture;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::config::draft::DraftConfig;
use crate::domain::fallback::{resolve_timeout, TimeoutOutcome};
use crate::domain::gateway;
use crate::domain::lobby::{self, CoinFace, LeaveOutcome};
use crate::domain::snapshot::DraftSnapshot;
use crate::domain::state::{Action, ActionKind, Draft, Quotas, Side, Turn};
use crate::errors::domain::{AuthorizationKind, ConflictKind, DomainError};
use crate::repos::drafts::DraftStore;
use crate::services::draft_flow::timer::{display_seconds, TurnTimer};
use crate::services::notifier::{DraftEvent, Notifier};

/// Facts a mutation reports besides the new draft state.
#[derive(Debug, Clone, PartialEq)]
pub enum DraftTransition {
    CoinTossed { face: CoinFace, first_mover: Side },
    AutoResolved(Action),
    ForcedCompletion,
    Emptied,
}

/// Who initiated a unit; decides how a failed save is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Player,
    Timer,
}

struct DraftCell {
    draft: Draft,
    timer: TurnTimer,
    rng: ChaCha8Rng,
}

pub struct DraftSession {
    draft_id: String,
    store: Arc<dyn DraftStore>,
    notifier: Arc<dyn Notifier>,
    config: DraftConfig,
    cell: Mutex<DraftCell>,
}

impl std::fmt::Debug for DraftSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DraftSession")
            .field("draft_id", &self.draft_id)
            .field("store", &self.store.kind())
            .finish_non_exhaustive()
    }
}

fn participant_side(draft: &Draft, identity: &str) -> Result<Side, DomainError> {
    draft.side_of(identity).ok_or_else(|| {
        DomainError::authorization(
            AuthorizationKind::UnknownParticipant,
            "caller is not a participant of this draft",
        )
    })
}

impl DraftSession {
    pub(crate) fn new(
        draft_id: String,
        draft: Draft,
        store: Arc<dyn DraftStore>,
        notifier: Arc<dyn Notifier>,
        config: DraftConfig,
    ) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_os_rng(),
        };
        Self {
            draft_id,
            store,
            notifier,
            config,
            cell: Mutex::new(DraftCell {
                draft,
                timer: TurnTimer::new(),
                rng,
            }),
        }
    }

    pub fn draft_id(&self) -> &str {
        &self.draft_id
    }

    pub async fn snapshot(&self) -> DraftSnapshot {
        let cell = self.cell.lock().await;
        DraftSnapshot::of(&self.draft_id, &cell.draft)
    }

    /// Whether a countdown is currently running for this draft.
    pub async fn timer_armed(&self) -> bool {
        self.cell.lock().await.timer.is_armed()
    }

    /// Nobody is seated or the draft is finished, and no countdown runs.
    /// A session busy with a unit of work is never idle.
    pub(crate) fn is_idle(&self) -> bool {
        match self.cell.try_lock() {
            Ok(cell) => {
                !cell.timer.is_armed()
                    && (cell.draft.participants.is_empty() || cell.draft.is_completed())
            }
            Err(_) => false,
        }
    }

    pub async fn join(self: &Arc<Self>, identity: &str, side: Side) -> Result<DraftSnapshot, DomainError> {
        self.run_unit(Origin::Player, |draft, _| {
            lobby::join(draft, identity, side)?;
            Ok(Vec::new())
        })
        .await
    }

    pub async fn leave(self: &Arc<Self>, identity: &str) -> Result<DraftSnapshot, DomainError> {
        self.run_unit(Origin::Player, |draft, _| {
            Ok(match lobby::leave(draft, identity)? {
                LeaveOutcome::Left => Vec::new(),
                LeaveOutcome::Emptied => vec![DraftTransition::Emptied],
            })
        })
        .await
    }

    pub async fn configure_quotas(
        self: &Arc<Self>,
        identity: &str,
        quotas: Quotas,
    ) -> Result<DraftSnapshot, DomainError> {
        self.run_unit(Origin::Player, |draft, _| {
            let side = participant_side(draft, identity)?;
            lobby::configure_quotas(draft, side, quotas)?;
            Ok(Vec::new())
        })
        .await
    }

    pub async fn lock_quotas(self: &Arc<Self>, identity: &str) -> Result<DraftSnapshot, DomainError> {
        self.run_unit(Origin::Player, |draft, _| {
            let side = participant_side(draft, identity)?;
            lobby::lock_quotas(draft, side)?;
            Ok(Vec::new())
        })
        .await
    }

    pub async fn add_candidate(
        self: &Arc<Self>,
        identity: &str,
        item_id: &str,
    ) -> Result<DraftSnapshot, DomainError> {
        self.run_unit(Origin::Player, |draft, _| {
            let side = participant_side(draft, identity)?;
            lobby::add_candidate(draft, side, item_id)?;
            Ok(Vec::new())
        })
        .await
    }

    pub async fn mark_ready(self: &Arc<Self>, identity: &str) -> Result<DraftSnapshot, DomainError> {
        self.run_unit(Origin::Player, |draft, _| {
            let side = participant_side(draft, identity)?;
            lobby::mark_ready(draft, side)?;
            Ok(Vec::new())
        })
        .await
    }

    /// Toss the coin and open the first turn.
    pub async fn start(self: &Arc<Self>, identity: &str) -> Result<DraftSnapshot, DomainError> {
        self.run_unit(Origin::Player, |draft, rng| {
            let side = participant_side(draft, identity)?;
            let face = CoinFace::from_bool(rng.random::<bool>());
            let first_mover = lobby::start(draft, side, face)?;
            Ok(vec![DraftTransition::CoinTossed { face, first_mover }])
        })
        .await
    }

    /// Player submission for the current turn.
    ///
    /// `expected_version` is checked before anything else; a stale client
    /// gets `OptimisticLock` even if its action would otherwise be legal.
    pub async fn submit(
        self: &Arc<Self>,
        identity: &str,
        kind: ActionKind,
        item_id: &str,
        expected_version: Option<u64>,
    ) -> Result<DraftSnapshot, DomainError> {
        self.run_unit(Origin::Player, |draft, _| {
            if let Some(expected) = expected_version {
                if expected != draft.version {
                    return Err(DomainError::conflict(
                        ConflictKind::OptimisticLock,
                        format!(
                            "draft version mismatch: expected {expected}, current {}",
                            draft.version
                        ),
                    ));
                }
            }
            *draft = gateway::submit(draft, identity, kind, item_id)?;
            Ok(Vec::new())
        })
        .await
    }

    pub async fn reset(self: &Arc<Self>, identity: &str) -> Result<DraftSnapshot, DomainError> {
        self.run_unit(Origin::Player, |draft, _| {
            let side = participant_side(draft, identity)?;
            lobby::reset(draft, side)?;
            Ok(Vec::new())
        })
        .await
    }

    /// Re-arm the countdown of a turn loaded from the store, for whatever is
    /// left until its persisted deadline. Expired turns fire immediately.
    pub async fn resume(self: &Arc<Self>) {
        let mut cell = self.cell.lock().await;
        if cell.timer.is_armed() {
            return;
        }
        let Some(tick) = self.arm_remaining(&mut cell) else {
            return;
        };
        info!(draft_id = %self.draft_id, version = cell.draft.version, "turn timer resumed");
        drop(cell);
        self.notifier.publish(&self.draft_id, tick);
    }

    /// Timer expiry for the turn armed at `armed_version`.
    pub fn handle_timeout(self: Arc<Self>, armed_version: u64) -> BoxFuture<'static, ()> {
        Box::pin(async move {
            {
                let mut cell = self.cell.lock().await;
                if cell.draft.version != armed_version
                    || cell.timer.armed_version() != Some(armed_version)
                {
                    debug!(
                        draft_id = %self.draft_id,
                        armed_version,
                        current_version = cell.draft.version,
                        "stale turn timer ignored"
                    );
                    return;
                }
                cell.timer.detach();
            }

            let outcome = self
                .run_unit(Origin::Timer, |draft, rng| {
                    // The version may have moved between the two lock scopes.
                    if draft.version != armed_version {
                        return Ok(Vec::new());
                    }
                    Ok(match resolve_timeout(draft, rng) {
                        TimeoutOutcome::AutoResolved(action) => {
                            vec![DraftTransition::AutoResolved(action)]
                        }
                        TimeoutOutcome::ForcedCompletion => vec![DraftTransition::ForcedCompletion],
                        TimeoutOutcome::Idle => Vec::new(),
                    })
                })
                .await;
            if let Err(err) = outcome {
                error!(draft_id = %self.draft_id, armed_version, error = %err, "turn timeout not applied");
            }
        })
    }

    /// Run one mutation under the draft lock.
    ///
    /// The closure works on a copy; a rejection leaves the draft and its
    /// timer untouched. An accepted change disarms the timer, bumps the
    /// version, persists, then commits and re-arms. Events go out after the
    /// lock is released.
    async fn run_unit<F>(self: &Arc<Self>, origin: Origin, mutation: F) -> Result<DraftSnapshot, DomainError>
    where
        F: FnOnce(&mut Draft, &mut ChaCha8Rng) -> Result<Vec<DraftTransition>, DomainError>,
    {
        let mut cell = self.cell.lock().await;
        let mut next = cell.draft.clone();
        let transitions = mutation(&mut next, &mut cell.rng)?;

        if next == cell.draft {
            return Ok(DraftSnapshot::of(&self.draft_id, &cell.draft));
        }

        // Lobby changes during a turn (leave, rejoin) keep its countdown.
        let same_turn = next.pending_turn().is_some()
            && next.pending_turn() == cell.draft.pending_turn()
            && next.history.len() == cell.draft.history.len();
        let remaining_before = cell.timer.remaining();
        let carried = if same_turn { remaining_before } else { None };

        cell.timer.disarm();
        next.version = cell.draft.version + 1;
        next.turn_deadline = match (next.pending_turn(), carried) {
            (None, _) => None,
            (Some(_), Some(_)) if cell.draft.turn_deadline.is_some() => cell.draft.turn_deadline,
            (Some(_), Some(left)) => Some(OffsetDateTime::now_utc() + left),
            (Some(_), None) => Some(OffsetDateTime::now_utc() + self.config.turn_duration),
        };

        if let Err(err) = self.store.save(&self.draft_id, &next).await {
            match origin {
                Origin::Player => {
                    warn!(draft_id = %self.draft_id, error = %err, "draft save failed; restoring turn timer");
                    // Ticks continue from the previous deadline.
                    match (cell.draft.pending_turn(), remaining_before) {
                        (Some(turn), Some(left)) => {
                            let _ = self.arm(&mut cell, turn, left);
                        }
                        _ => {
                            let _ = self.arm_remaining(&mut cell);
                        }
                    }
                }
                Origin::Timer => {
                    error!(draft_id = %self.draft_id, error = %err, "draft save failed in timer path");
                }
            }
            return Err(err);
        }

        cell.draft = next;
        let snapshot = DraftSnapshot::of(&self.draft_id, &cell.draft);
        debug!(
            draft_id = %self.draft_id,
            version = snapshot.version,
            stage = ?snapshot.stage,
            "draft committed"
        );

        let mut events = self.transition_events(&transitions, &snapshot);
        events.push(DraftEvent::DraftStateChanged {
            snapshot: snapshot.clone(),
        });
        if let Some(turn) = cell.draft.pending_turn() {
            let remaining = carried.unwrap_or(self.config.turn_duration);
            events.push(self.arm(&mut cell, turn, remaining));
        }
        drop(cell);

        for event in events {
            self.notifier.publish(&self.draft_id, event);
        }
        Ok(snapshot)
    }

    fn transition_events(&self, transitions: &[DraftTransition], snapshot: &DraftSnapshot) -> Vec<DraftEvent> {
        let mut events = Vec::new();
        for transition in transitions {
            match transition {
                DraftTransition::CoinTossed { face, first_mover } => {
                    info!(draft_id = %self.draft_id, face = ?face, first_mover = %first_mover, "coin toss resolved");
                    events.push(DraftEvent::CoinTossResolved {
                        draft_id: self.draft_id.clone(),
                        first_mover: *first_mover,
                        face: *face,
                    });
                }
                DraftTransition::AutoResolved(action) => {
                    info!(
                        draft_id = %self.draft_id,
                        item_id = %action.item_id,
                        side = %action.side,
                        kind = action.kind.as_str(),
                        "turn auto-resolved"
                    );
                    events.push(DraftEvent::TurnAutoResolved {
                        item_id: action.item_id.clone(),
                        kind: action.kind,
                        side: action.side,
                        snapshot: snapshot.clone(),
                    });
                }
                DraftTransition::ForcedCompletion => {
                    warn!(draft_id = %self.draft_id, "no eligible item left; draft force-completed");
                }
                DraftTransition::Emptied => {
                    info!(draft_id = %self.draft_id, "last participant left; draft reset");
                }
            }
        }
        events
    }

    /// Arm the countdown for `turn` and return the initial tick.
    fn arm(self: &Arc<Self>, cell: &mut DraftCell, turn: Turn, remaining: std::time::Duration) -> DraftEvent {
        let version = cell.draft.version;
        let tick = move |draft_id: &str, secs: u64| DraftEvent::TurnTimerTick {
            draft_id: draft_id.to_string(),
            version,
            remaining_seconds: secs,
            kind: turn.kind,
            side: turn.owner,
        };

        let notifier = Arc::clone(&self.notifier);
        let draft_id = self.draft_id.clone();
        let weak = Arc::downgrade(self);
        let on_fire: BoxFuture<'static, ()> = Box::pin(async move {
            if let Some(session) = weak.upgrade() {
                session.handle_timeout(version).await;
            }
        });
        cell.timer.arm(
            version,
            remaining,
            move |secs| notifier.publish(&draft_id, tick(&draft_id, secs)),
            on_fire,
        );
        tick(&self.draft_id, display_seconds(remaining))
    }

    /// Arm for the time left until the committed draft's deadline.
    fn arm_remaining(self: &Arc<Self>, cell: &mut DraftCell) -> Option<DraftEvent> {
        let turn = cell.draft.pending_turn()?;
        let remaining = match cell.draft.turn_deadline {
            Some(deadline) => {
                let left = deadline - OffsetDateTime::now_utc();
                std::time::Duration::try_from(left).unwrap_or_default()
            }
            None => self.config.turn_duration,
        };
        Some(self.arm(cell, turn, remaining))
    }
}
