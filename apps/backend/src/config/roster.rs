//! `DRAFT_ROSTER` parsing: `name:secret:SIDE` entries separated by `;`.

use crate::domain::state::Side;
use crate::error::AppError;

#[derive(Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub name: String,
    /// blake3 digest of the configured secret; the plain secret is not kept.
    pub secret_digest: [u8; 32],
    pub side: Side,
}

impl std::fmt::Debug for RosterEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RosterEntry")
            .field("name", &self.name)
            .field("secret_digest", &"<redacted>")
            .field("side", &self.side)
            .finish()
    }
}

impl RosterEntry {
    pub fn new(name: impl Into<String>, secret: &str, side: Side) -> Self {
        Self {
            name: name.into(),
            secret_digest: *blake3::hash(secret.as_bytes()).as_bytes(),
            side,
        }
    }
}

pub fn parse_roster(raw: &str) -> Result<Vec<RosterEntry>, AppError> {
    let mut entries: Vec<RosterEntry> = Vec::new();
    for chunk in raw.split(';').map(str::trim).filter(|c| !c.is_empty()) {
        let mut parts = chunk.splitn(3, ':');
        let (Some(name), Some(secret), Some(side)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(AppError::config(format!(
                "DRAFT_ROSTER entry must be name:secret:SIDE, got {chunk:?}"
            )));
        };
        let name = name.trim();
        if name.is_empty() || secret.is_empty() {
            return Err(AppError::config("DRAFT_ROSTER entries need a name and a secret"));
        }
        let side = side
            .parse::<Side>()
            .map_err(|e| AppError::config(format!("DRAFT_ROSTER: {e}")))?;
        if entries.iter().any(|e| e.name == name) {
            return Err(AppError::config(format!("DRAFT_ROSTER: duplicate name {name}")));
        }
        entries.push(RosterEntry::new(name, secret, side));
    }
    Ok(entries)
}
