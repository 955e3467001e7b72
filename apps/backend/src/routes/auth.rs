use std::time::SystemTime;

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::jwt::{mint_access_token, ACCESS_TOKEN_TTL_SECS};
use crate::domain::state::Side;
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::extractors::{CurrentPlayer, ValidatedJson};
use crate::middleware::jwt_extract::JwtExtract;
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub secret: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub identity: String,
    pub side: Side,
    pub expires_in: i64,
}

/// POST /api/auth/login
async fn login(
    body: ValidatedJson<LoginRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let LoginRequest { username, secret } = body.into_inner();
    if username.trim().is_empty() || secret.is_empty() {
        return Err(AppError::bad_request(
            ErrorCode::ValidationError,
            "username and secret are required",
        ));
    }

    let resolved = app_state.identity.authenticate(&username, &secret).await?;
    let token = mint_access_token(
        &resolved.identity_id,
        resolved.side,
        SystemTime::now(),
        &app_state.security,
    )?;
    info!(identity = %resolved.identity_id, side = %resolved.side, "login succeeded");

    Ok(HttpResponse::Ok().json(LoginResponse {
        token,
        identity: resolved.identity_id,
        side: resolved.side,
        expires_in: ACCESS_TOKEN_TTL_SECS,
    }))
}

/// GET /api/auth/me
async fn me(player: CurrentPlayer) -> web::Json<CurrentPlayer> {
    web::Json(player)
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/login", web::post().to(login));
    cfg.service(web::resource("/me").wrap(JwtExtract).route(web::get().to(me)));
}
