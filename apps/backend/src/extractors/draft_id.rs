use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};

use crate::error::AppError;
use crate::services::draft_flow::validate_draft_id;

/// `{draft_id}` path segment, syntax-checked. Existence is up to the handler
/// since reads and joins create drafts lazily.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftId(pub String);

impl DraftId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromRequest for DraftId {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let raw = req.match_info().get("draft_id").unwrap_or_default();
        ready(
            validate_draft_id(raw)
                .map(|()| DraftId(raw.to_string()))
                .map_err(AppError::from),
        )
    }
}
