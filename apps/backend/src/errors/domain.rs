//! Domain-level error type used across the draft core, services and stores.
//!
//! This error type is HTTP- and DB-agnostic. Handlers return
//! `Result<T, crate::error::AppError>` and convert from `DomainError`
//! through `From<DomainError> for AppError`.

use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Malformed or out-of-range input.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationKind {
    InvalidQuota,
    InvalidItemId,
    InvalidDraftId,
    NotInPool,
    PoolTooSmall,
    Other(String),
}

/// Wrong side or role for the requested operation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AuthorizationKind {
    /// The caller is not a participant of the draft.
    UnknownParticipant,
    /// Only the coordinator side may perform this operation.
    CoordinatorOnly,
    InvalidCredentials,
}

/// Turn/phase/state mismatch.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConflictKind {
    NotYourTurn,
    WrongActionKind,
    AlreadyResolved,
    SessionComplete,
    StageMismatch,
    AlreadyReady,
    NotAllReady,
    DuplicateCandidate,
    DraftFull,
    SideTaken,
    OptimisticLock,
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NotFoundKind {
    Draft,
    Other(String),
}

/// Infra error kinds to distinguish operational failures
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InfraErrorKind {
    DbUnavailable,
    DataCorruption,
    Other(String),
}

/// Central domain error type
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Input validation or business rule violation
    Validation(ValidationKind, String),
    /// Caller lacks the side/role for this operation
    Authorization(AuthorizationKind, String),
    /// Semantic conflict with the current draft state
    Conflict(ConflictKind, String),
    /// Missing resource in domain terms
    NotFound(NotFoundKind, String),
    /// Infrastructure/operational failures (retryable)
    Infra(InfraErrorKind, String),
}

impl Display for DomainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DomainError::Validation(kind, d) => write!(f, "validation error {kind:?}: {d}"),
            DomainError::Authorization(kind, d) => write!(f, "authorization error {kind:?}: {d}"),
            DomainError::Conflict(kind, d) => write!(f, "conflict {kind:?}: {d}"),
            DomainError::NotFound(kind, d) => write!(f, "not found {kind:?}: {d}"),
            DomainError::Infra(kind, d) => write!(f, "infra {kind:?}: {d}"),
        }
    }
}

impl Error for DomainError {}

impl DomainError {
    pub fn validation(kind: ValidationKind, detail: impl Into<String>) -> Self {
        Self::Validation(kind, detail.into())
    }
    pub fn authorization(kind: AuthorizationKind, detail: impl Into<String>) -> Self {
        Self::Authorization(kind, detail.into())
    }
    pub fn conflict(kind: ConflictKind, detail: impl Into<String>) -> Self {
        Self::Conflict(kind, detail.into())
    }
    pub fn not_found(kind: NotFoundKind, detail: impl Into<String>) -> Self {
        Self::NotFound(kind, detail.into())
    }
    pub fn infra(kind: InfraErrorKind, detail: impl Into<String>) -> Self {
        Self::Infra(kind, detail.into())
    }

    /// Persistence failures are the only errors a caller should retry as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DomainError::Infra(InfraErrorKind::DbUnavailable, _)
        )
    }
}
