//! JWT claims used across the application.

use serde::{Deserialize, Serialize};

use crate::domain::state::Side;

/// Claims carried by backend-issued access tokens and inserted into request
/// extensions by the authentication middleware.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Identity id resolved by the identity provider.
    pub sub: String,
    /// Side the identity plays on.
    pub side: Side,
    /// Issued-at (seconds since epoch)
    pub iat: i64,
    /// Expiry (seconds since epoch)
    pub exp: i64,
}
