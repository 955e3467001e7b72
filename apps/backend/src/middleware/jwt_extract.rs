//! Bearer authentication for `/api/drafts/*`, `/api/auth/me` and `/ws/*`.
//!
//! Reads the token from `Authorization: Bearer ...` or, for browsers opening
//! a websocket, from `?token=`. Verified claims go into the request
//! extensions for `CurrentPlayer`.

use std::collections::HashMap;

use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header;
use actix_web::{web, Error, HttpMessage};
use futures_util::future::{ready, LocalBoxFuture, Ready};
use tracing::debug;

use crate::auth::jwt::verify_access_token;
use crate::error::AppError;
use crate::state::app_state::AppState;

pub struct JwtExtract;

impl<S, B> Transform<S, ServiceRequest> for JwtExtract
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtExtractMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtExtractMiddleware { service }))
    }
}

pub struct JwtExtractMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for JwtExtractMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let claims = authenticate(&req);
        match claims {
            Ok(claims) => {
                req.extensions_mut().insert(claims);
                let fut = self.service.call(req);
                Box::pin(async move { Ok(fut.await?.map_into_left_body()) })
            }
            Err(err) => {
                debug!(path = req.path(), code = %err.code(), "request rejected by auth");
                // Rendered when polled so the problem body sees the trace id.
                Box::pin(async move { Ok(req.error_response(err).map_into_right_body()) })
            }
        }
    }
}

fn authenticate(req: &ServiceRequest) -> Result<crate::auth::claims::Claims, AppError> {
    let token = match bearer_from_header(req.headers().get(header::AUTHORIZATION))? {
        Some(token) => token,
        None => token_from_query(req.uri().query()).ok_or_else(AppError::unauthorized_missing_bearer)?,
    };
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::internal("AppState not available"))?;
    verify_access_token(&token, &state.security)
}

fn bearer_from_header(value: Option<&header::HeaderValue>) -> Result<Option<String>, AppError> {
    let Some(value) = value else {
        return Ok(None);
    };
    let raw = value
        .to_str()
        .map_err(|_| AppError::unauthorized_missing_bearer())?;
    match raw.split_once(' ') {
        Some(("Bearer", token)) if !token.trim().is_empty() => Ok(Some(token.trim().to_string())),
        _ => Err(AppError::unauthorized_missing_bearer()),
    }
}

fn token_from_query(query: Option<&str>) -> Option<String> {
    let params = web::Query::<HashMap<String, String>>::from_query(query?).ok()?;
    params.get("token").filter(|t| !t.is_empty()).cloned()
}
