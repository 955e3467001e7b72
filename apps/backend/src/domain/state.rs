use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Item identifiers are opaque slugs (map or weapon names).
pub type ItemId = String;

/// Upper bound for either quota; keeps pools and timers bounded.
pub const MAX_QUOTA: u32 = 32;

/// One of the two competing parties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl Side {
    /// The coordinator configures, locks, fills the pool, starts and resets.
    pub const COORDINATOR: Side = Side::A;

    pub fn other(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::A => "A",
            Side::B => "B",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "A" | "a" => Ok(Side::A),
            "B" | "b" => Ok(Side::B),
            other => Err(format!("unknown side: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Ban,
    Pick,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Ban => "ban",
            ActionKind::Pick => "pick",
        }
    }
}

/// Lobby/draft progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DraftStage {
    /// Quotas may still be changed by the coordinator.
    Configuring,
    /// Quotas fixed; the coordinator fills the candidate pool.
    Locked,
    /// At least one side is ready; the pool is frozen.
    AwaitingReady,
    /// Turns are being taken.
    InProgress,
    /// Terminal.
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Quotas {
    /// Ban turns per side.
    pub ban: u32,
    /// Pick turns per side.
    pub pick: u32,
}

impl Quotas {
    pub fn new(ban: u32, pick: u32) -> Self {
        Self { ban, pick }
    }

    /// Total number of actions in a full draft (both sides).
    pub fn total_actions(&self) -> usize {
        2 * (self.ban as usize + self.pick as usize)
    }

    /// History index at which the pick phase begins.
    pub fn ban_boundary(&self) -> usize {
        2 * self.ban as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub identity: String,
    pub side: Side,
}

/// A resolved ban or pick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub item_id: ItemId,
    pub side: Side,
    pub kind: ActionKind,
}

/// The pending turn: who acts and what they do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub owner: Side,
    pub kind: ActionKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Readiness {
    pub a: bool,
    pub b: bool,
}

impl Readiness {
    pub fn get(&self, side: Side) -> bool {
        match side {
            Side::A => self.a,
            Side::B => self.b,
        }
    }

    pub fn set(&mut self, side: Side, ready: bool) {
        match side {
            Side::A => self.a = ready,
            Side::B => self.b = ready,
        }
    }

    pub fn both(&self) -> bool {
        self.a && self.b
    }
}

/// Canonical record of one draft.
///
/// `version` is bumped by the owning session on every committed mutation and
/// never decreases, not even across resets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub participants: Vec<Participant>,
    /// Ordered; immutable once the first side marks ready.
    pub candidate_pool: Vec<ItemId>,
    pub quotas: Quotas,
    /// Append-only, never holds the same item twice.
    pub history: Vec<Action>,
    pub first_mover: Option<Side>,
    pub turn: Option<Turn>,
    pub readiness: Readiness,
    pub stage: DraftStage,
    #[serde(with = "time::serde::rfc3339::option", default)]
    pub turn_deadline: Option<OffsetDateTime>,
    pub version: u64,
}

impl Default for Draft {
    fn default() -> Self {
        Self::new()
    }
}

impl Draft {
    pub fn new() -> Self {
        Self {
            participants: Vec::with_capacity(2),
            candidate_pool: Vec::new(),
            quotas: Quotas::default(),
            history: Vec::new(),
            first_mover: None,
            turn: None,
            readiness: Readiness::default(),
            stage: DraftStage::Configuring,
            turn_deadline: None,
            version: 0,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.stage == DraftStage::Completed
    }

    /// Turn that the timer should be armed for, if any.
    pub fn pending_turn(&self) -> Option<Turn> {
        match self.stage {
            DraftStage::InProgress => self.turn,
            _ => None,
        }
    }

    pub fn side_of(&self, identity: &str) -> Option<Side> {
        self.participants
            .iter()
            .find(|p| p.identity == identity)
            .map(|p| p.side)
    }

    pub fn occupant(&self, side: Side) -> Option<&Participant> {
        self.participants.iter().find(|p| p.side == side)
    }

    pub fn in_pool(&self, item_id: &str) -> bool {
        self.candidate_pool.iter().any(|i| i == item_id)
    }

    pub fn is_resolved(&self, item_id: &str) -> bool {
        self.history.iter().any(|a| a.item_id == item_id)
    }

    /// `candidate_pool \ history`, in pool order.
    pub fn remaining_items(&self) -> Vec<&ItemId> {
        self.candidate_pool
            .iter()
            .filter(|item| !self.is_resolved(item))
            .collect()
    }

    /// Clear everything except participants and the version counter.
    pub fn reset(&mut self) {
        let participants = std::mem::take(&mut self.participants);
        let version = self.version;
        *self = Draft {
            participants,
            version,
            ..Draft::new()
        };
    }
}
