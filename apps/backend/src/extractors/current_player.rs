use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpMessage, HttpRequest};
use serde::{Deserialize, Serialize};

use crate::auth::claims::Claims;
use crate::domain::state::Side;
use crate::error::AppError;

/// Authenticated caller, taken from the claims `JwtExtract` stored in the
/// request extensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentPlayer {
    pub identity: String,
    pub side: Side,
}

impl From<Claims> for CurrentPlayer {
    fn from(claims: Claims) -> Self {
        Self {
            identity: claims.sub,
            side: claims.side,
        }
    }
}

impl FromRequest for CurrentPlayer {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let player = req
            .extensions()
            .get::<Claims>()
            .cloned()
            .map(CurrentPlayer::from)
            .ok_or_else(AppError::unauthorized);
        ready(player)
    }
}
