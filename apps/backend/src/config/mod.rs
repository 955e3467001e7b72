//! Process configuration read once from the environment at startup.

pub mod draft;
pub mod roster;

use std::env;
use std::time::Duration;

pub use draft::DraftConfig;
pub use roster::{parse_roster, RosterEntry};

use crate::error::AppError;

/// Everything `main` needs to assemble the server.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub jwt_secret: Vec<u8>,
    /// `None` selects the in-memory draft store.
    pub database_url: Option<String>,
    pub draft: DraftConfig,
    pub roster: Vec<RosterEntry>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup so tests need not touch the process env.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = non_empty("BACKEND_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match non_empty("BACKEND_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| AppError::config(format!("BACKEND_PORT must be a valid port number, got {raw:?}")))?,
            None => 3001,
        };

        let jwt_secret = non_empty("BACKEND_JWT_SECRET")
            .ok_or_else(|| AppError::config("BACKEND_JWT_SECRET must be set"))?
            .into_bytes();

        let turn_seconds = match non_empty("DRAFT_TURN_SECONDS") {
            Some(raw) => {
                let secs = raw.trim().parse::<u64>().map_err(|_| {
                    AppError::config(format!("DRAFT_TURN_SECONDS must be an integer, got {raw:?}"))
                })?;
                if secs < 1 {
                    return Err(AppError::config("DRAFT_TURN_SECONDS must be at least 1"));
                }
                secs
            }
            None => draft::DEFAULT_TURN_SECONDS,
        };

        let roster = match non_empty("DRAFT_ROSTER") {
            Some(raw) => parse_roster(&raw)?,
            None => Vec::new(),
        };

        Ok(Self {
            host,
            port,
            jwt_secret,
            database_url: non_empty("DATABASE_URL"),
            draft: DraftConfig::new(Duration::from_secs(turn_seconds)),
            roster,
        })
    }
}
