//! SeaORM -> DomainError translation helpers.
//!
//! Adapters convert `sea_orm::DbErr` into `DomainError` here; higher layers
//! then map `DomainError` to `AppError` via `From`.

use tracing::{error, warn};

use crate::errors::domain::{DomainError, InfraErrorKind, NotFoundKind};

/// Translate a `DbErr` into a `DomainError` with sanitized detail.
///
/// Every operational failure is surfaced as `DbUnavailable` so callers can
/// retry; the raw message only goes to the logs.
pub fn map_db_err(e: sea_orm::DbErr) -> DomainError {
    match &e {
        sea_orm::DbErr::RecordNotFound(_) => {
            DomainError::not_found(NotFoundKind::Draft, "Draft not found")
        }
        sea_orm::DbErr::ConnectionAcquire(_) | sea_orm::DbErr::Conn(_) => {
            warn!(raw_error = %e, "Database unavailable");
            DomainError::infra(InfraErrorKind::DbUnavailable, "Database unavailable")
        }
        _ => {
            error!(raw_error = %e, "Unhandled database error");
            DomainError::infra(
                InfraErrorKind::DbUnavailable,
                "Database operation failed",
            )
        }
    }
}
