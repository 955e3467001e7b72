//! Draft ETags: `"draft-{id}-v{version}"`.
//!
//! `GET` answers `If-None-Match` with 304; action submission accepts
//! `If-Match` as an alternative to an explicit expected version.

use crate::error::AppError;
use crate::errors::ErrorCode;

pub fn draft_etag(draft_id: &str, version: u64) -> String {
    format!(r#""draft-{draft_id}-v{version}""#)
}

/// Version carried by a draft ETag. Quotes and a weak `W/` prefix are
/// tolerated.
pub fn parse_draft_version_from_etag(raw: &str) -> Result<u64, AppError> {
    let tag = raw.trim();
    let tag = tag.strip_prefix("W/").unwrap_or(tag).trim_matches('"');

    let Some(marker) = tag.rfind("-v") else {
        return Err(AppError::bad_request(
            ErrorCode::InvalidHeader,
            format!("malformed draft ETag: {raw}"),
        ));
    };
    if !tag.starts_with("draft-") {
        return Err(AppError::bad_request(
            ErrorCode::InvalidHeader,
            format!("not a draft ETag: {raw}"),
        ));
    }
    let digits = &tag[marker + 2..];
    digits.parse::<u64>().map_err(|_| {
        AppError::bad_request(
            ErrorCode::InvalidHeader,
            format!("ETag version is not a number: {digits:?}"),
        )
    })
}

/// True when any tag in an `If-None-Match` list names this exact version.
pub fn matches_if_none_match(header: &str, current: &str) -> bool {
    header
        .split(',')
        .map(str::trim)
        .any(|tag| tag == "*" || tag == current || tag.strip_prefix("W/") == Some(current))
}
