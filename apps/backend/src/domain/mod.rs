//! Domain layer: pure draft logic types and helpers.

pub mod fallback;
pub mod gateway;
pub mod lobby;
pub mod sequencer;
pub mod snapshot;
pub mod state;

#[cfg(test)]
mod tests_lobby;

// Re-exports for ergonomics
pub use gateway::RejectionReason;
pub use lobby::CoinFace;
pub use snapshot::DraftSnapshot;
pub use state::{Action, ActionKind, Draft, DraftStage, ItemId, Quotas, Side, Turn};
