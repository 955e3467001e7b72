//! Draft HTTP routes under `/api/drafts/{draft_id}`.
//!
//! Every mutating route answers with the new snapshot and its `ETag`.
//! Only `GET` and `join` create a draft that does not exist yet.

use actix_web::http::header::{ETAG, IF_MATCH, IF_NONE_MATCH};
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;

use crate::domain::snapshot::DraftSnapshot;
use crate::domain::state::{ActionKind, Quotas};
use crate::error::AppError;
use crate::extractors::{CurrentPlayer, DraftId, ValidatedJson};
use crate::http::etag::{draft_etag, matches_if_none_match, parse_draft_version_from_etag};
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
pub struct QuotasRequest {
    pub ban: u32,
    pub pick: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateRequest {
    #[serde(alias = "item_id")]
    pub item_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRequest {
    pub kind: ActionKind,
    #[serde(alias = "item_id")]
    pub item_id: String,
    /// Falls back to `If-Match` when absent.
    #[serde(default, alias = "expected_version")]
    pub expected_version: Option<u64>,
}

fn snapshot_response(snapshot: DraftSnapshot) -> HttpResponse {
    HttpResponse::Ok()
        .insert_header((ETAG, draft_etag(&snapshot.draft_id, snapshot.version)))
        .json(snapshot)
}

/// GET /api/drafts/{draft_id}
async fn get_draft(
    req: HttpRequest,
    draft_id: DraftId,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let snapshot = app_state.drafts.snapshot(draft_id.as_str()).await?;
    let etag = draft_etag(&snapshot.draft_id, snapshot.version);

    let not_modified = req
        .headers()
        .get(IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| matches_if_none_match(v, &etag));
    if not_modified {
        return Ok(HttpResponse::build(StatusCode::NOT_MODIFIED)
            .insert_header((ETAG, etag))
            .finish());
    }

    Ok(snapshot_response(snapshot))
}

/// POST /api/drafts/{draft_id}/join
async fn join(
    draft_id: DraftId,
    player: CurrentPlayer,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let session = app_state.drafts.open(draft_id.as_str()).await?;
    let outcome = session.join(&player.identity, player.side).await;
    app_state.drafts.release(session);
    Ok(snapshot_response(outcome?))
}

/// POST /api/drafts/{draft_id}/leave
async fn leave(
    draft_id: DraftId,
    player: CurrentPlayer,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let session = app_state.drafts.existing(draft_id.as_str()).await?;
    let outcome = session.leave(&player.identity).await;
    app_state.drafts.release(session);
    Ok(snapshot_response(outcome?))
}

/// PUT /api/drafts/{draft_id}/quotas
async fn configure_quotas(
    draft_id: DraftId,
    player: CurrentPlayer,
    body: ValidatedJson<QuotasRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let session = app_state.drafts.existing(draft_id.as_str()).await?;
    let quotas = Quotas::new(body.ban, body.pick);
    Ok(snapshot_response(
        session.configure_quotas(&player.identity, quotas).await?,
    ))
}

/// POST /api/drafts/{draft_id}/lock
async fn lock_quotas(
    draft_id: DraftId,
    player: CurrentPlayer,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let session = app_state.drafts.existing(draft_id.as_str()).await?;
    Ok(snapshot_response(session.lock_quotas(&player.identity).await?))
}

/// POST /api/drafts/{draft_id}/candidates
async fn add_candidate(
    draft_id: DraftId,
    player: CurrentPlayer,
    body: ValidatedJson<CandidateRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let session = app_state.drafts.existing(draft_id.as_str()).await?;
    Ok(snapshot_response(
        session.add_candidate(&player.identity, &body.item_id).await?,
    ))
}

/// POST /api/drafts/{draft_id}/ready
async fn mark_ready(
    draft_id: DraftId,
    player: CurrentPlayer,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let session = app_state.drafts.existing(draft_id.as_str()).await?;
    Ok(snapshot_response(session.mark_ready(&player.identity).await?))
}

/// POST /api/drafts/{draft_id}/start
async fn start(
    draft_id: DraftId,
    player: CurrentPlayer,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let session = app_state.drafts.existing(draft_id.as_str()).await?;
    let outcome = session.start(&player.identity).await;
    app_state.drafts.release(session);
    Ok(snapshot_response(outcome?))
}

/// POST /api/drafts/{draft_id}/actions
async fn submit_action(
    req: HttpRequest,
    draft_id: DraftId,
    player: CurrentPlayer,
    body: ValidatedJson<ActionRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let expected_version = match body.expected_version {
        Some(version) => Some(version),
        None => match req.headers().get(IF_MATCH) {
            Some(value) => {
                let raw = value.to_str().map_err(|_| {
                    AppError::bad_request(
                        crate::errors::ErrorCode::InvalidHeader,
                        "If-Match is not valid ASCII",
                    )
                })?;
                Some(parse_draft_version_from_etag(raw)?)
            }
            None => None,
        },
    };

    let session = app_state.drafts.existing(draft_id.as_str()).await?;
    let outcome = session
        .submit(&player.identity, body.kind, &body.item_id, expected_version)
        .await;
    app_state.drafts.release(session);
    Ok(snapshot_response(outcome?))
}

/// POST /api/drafts/{draft_id}/reset
async fn reset(
    draft_id: DraftId,
    player: CurrentPlayer,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let session = app_state.drafts.existing(draft_id.as_str()).await?;
    Ok(snapshot_response(session.reset(&player.identity).await?))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/{draft_id}", web::get().to(get_draft))
        .route("/{draft_id}/join", web::post().to(join))
        .route("/{draft_id}/leave", web::post().to(leave))
        .route("/{draft_id}/quotas", web::put().to(configure_quotas))
        .route("/{draft_id}/lock", web::post().to(lock_quotas))
        .route("/{draft_id}/candidates", web::post().to(add_candidate))
        .route("/{draft_id}/ready", web::post().to(mark_ready))
        .route("/{draft_id}/start", web::post().to(start))
        .route("/{draft_id}/actions", web::post().to(submit_action))
        .route("/{draft_id}/reset", web::post().to(reset));
}
