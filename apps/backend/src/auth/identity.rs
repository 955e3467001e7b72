//! Identity provider seam: credentials in, `{identity, side}` out.

use async_trait::async_trait;

use crate::config::roster::RosterEntry;
use crate::domain::state::Side;
use crate::errors::domain::{AuthorizationKind, DomainError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub identity_id: String,
    pub side: Side,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn authenticate(
        &self,
        username: &str,
        secret: &str,
    ) -> Result<ResolvedIdentity, DomainError>;
}

/// Static roster from configuration. Secrets are compared by blake3 digest.
#[derive(Debug, Clone, Default)]
pub struct RosterIdentityProvider {
    entries: Vec<RosterEntry>,
}

impl RosterIdentityProvider {
    pub fn new(entries: Vec<RosterEntry>) -> Self {
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn invalid_credentials() -> DomainError {
    DomainError::authorization(
        AuthorizationKind::InvalidCredentials,
        "unknown user or wrong secret",
    )
}

#[async_trait]
impl IdentityProvider for RosterIdentityProvider {
    async fn authenticate(
        &self,
        username: &str,
        secret: &str,
    ) -> Result<ResolvedIdentity, DomainError> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.name == username.trim())
            .ok_or_else(invalid_credentials)?;
        // blake3::Hash equality is constant-time.
        if blake3::hash(secret.as_bytes()) != blake3::Hash::from(entry.secret_digest) {
            return Err(invalid_credentials());
        }
        Ok(ResolvedIdentity {
            identity_id: entry.name.clone(),
            side: entry.side,
        })
    }
}
