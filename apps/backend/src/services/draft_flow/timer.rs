//! Per-turn countdown.
//!
//! `Idle -> Armed -> {Fired | Disarmed}`. While armed, the countdown task
//! reports every whole second left (N-1, ..., 1) exactly on the boundary and
//! then runs the fire future once. The caller emits the initial tick itself.

use std::time::Duration;

use futures::future::BoxFuture;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::trace;

#[derive(Debug, Default)]
pub struct TurnTimer {
    handle: Option<JoinHandle<()>>,
    armed_version: Option<u64>,
    deadline: Option<Instant>,
}

/// Whole seconds shown to clients for a remaining duration (rounded up).
pub fn display_seconds(remaining: Duration) -> u64 {
    let secs = remaining.as_secs();
    if remaining.subsec_nanos() > 0 {
        secs + 1
    } else {
        secs
    }
}

impl TurnTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_armed(&self) -> bool {
        self.handle.is_some()
    }

    /// Draft version the running countdown belongs to.
    pub fn armed_version(&self) -> Option<u64> {
        self.armed_version
    }

    /// Time left on the current countdown. Still reported after `detach`,
    /// as zero once the deadline has passed.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Start a countdown of `remaining`, replacing any running one.
    pub fn arm<T>(&mut self, version: u64, remaining: Duration, on_tick: T, on_fire: BoxFuture<'static, ()>)
    where
        T: Fn(u64) + Send + 'static,
    {
        self.disarm();
        let deadline = Instant::now() + remaining;
        trace!(version, remaining_ms = remaining.as_millis() as u64, "turn timer armed");
        self.handle = Some(tokio::spawn(countdown(deadline, on_tick, on_fire)));
        self.armed_version = Some(version);
        self.deadline = Some(deadline);
    }

    /// Cancel the countdown. Idempotent.
    pub fn disarm(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            trace!(version = ?self.armed_version, "turn timer disarmed");
        }
        self.armed_version = None;
        self.deadline = None;
    }

    /// Forget the countdown without cancelling it. Called from the fire
    /// future itself, which must keep running to completion.
    pub fn detach(&mut self) {
        self.handle.take();
        self.armed_version = None;
    }
}

impl Drop for TurnTimer {
    fn drop(&mut self) {
        self.disarm();
    }
}

async fn countdown<T>(deadline: Instant, on_tick: T, on_fire: BoxFuture<'static, ()>)
where
    T: Fn(u64) + Send + 'static,
{
    let start = Instant::now();
    let whole = deadline.saturating_duration_since(start).as_secs();
    for secs in (1..=whole).rev() {
        let Some(boundary) = deadline.checked_sub(Duration::from_secs(secs)) else {
            continue;
        };
        // The boundary at arm time was already reported by the caller.
        if boundary <= start {
            continue;
        }
        sleep_until(boundary).await;
        on_tick(secs);
    }
    sleep_until(deadline).await;
    on_fire.await;
}
