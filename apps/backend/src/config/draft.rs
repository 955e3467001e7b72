use std::time::Duration;

pub const DEFAULT_TURN_SECONDS: u64 = 30;

/// Per-draft runtime settings shared by every session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DraftConfig {
    /// Time a side has to act before the fallback resolves the turn.
    pub turn_duration: Duration,
    /// Fixed RNG seed for coin tosses and fallbacks. Tests only; `None`
    /// seeds every session from the OS.
    pub rng_seed: Option<u64>,
}

impl DraftConfig {
    pub fn new(turn_duration: Duration) -> Self {
        Self {
            turn_duration: turn_duration.max(Duration::from_secs(1)),
            rng_seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }
}

impl Default for DraftConfig {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_TURN_SECONDS))
    }
}
