//! Error codes for the draft backend API.
//!
//! Add new codes here; never pass ad-hoc strings as error codes.
//! All codes are SCREAMING_SNAKE_CASE and map 1:1 to the strings that
//! appear in HTTP responses and websocket error frames.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Authentication & Authorization
    /// Authentication required
    Unauthorized,
    /// Missing or malformed Bearer token
    UnauthorizedMissingBearer,
    /// Invalid JWT token
    UnauthorizedInvalidJwt,
    /// JWT token has expired
    UnauthorizedExpiredJwt,
    /// Username/secret pair rejected by the identity provider
    InvalidCredentials,
    /// Caller is not a participant of the draft
    UnknownParticipant,
    /// Operation reserved to the coordinator side
    CoordinatorOnly,

    // Request Validation
    /// Malformed request body
    BadRequest,
    /// Invalid or missing HTTP header
    InvalidHeader,
    /// Draft id does not match the accepted format
    InvalidDraftId,
    /// Item id does not match the accepted format
    InvalidItemId,
    /// Quota out of range
    InvalidQuota,
    /// Item is not part of the candidate pool
    NotInPool,
    /// Candidate pool smaller than the required action count
    PoolTooSmall,
    /// General validation error
    ValidationError,

    // Resource Not Found
    /// Draft does not exist yet
    DraftNotFound,
    /// General not found error
    NotFound,

    // Draft conflicts
    /// Side does not own the current turn
    NotYourTurn,
    /// Requested action kind differs from the current turn kind
    WrongActionKind,
    /// Item already banned or picked
    AlreadyResolved,
    /// Draft already completed
    SessionComplete,
    /// Operation not allowed in the current stage
    StageMismatch,
    /// Side already flagged ready
    AlreadyReady,
    /// Start attempted before both sides are ready
    NotAllReady,
    /// Candidate already in the pool
    DuplicateCandidate,
    /// Draft already has two participants
    DraftFull,
    /// Side already claimed by another identity
    SideTaken,
    /// Expected version does not match the draft version
    OptimisticLock,
    /// Generic conflict (fallback for unmatched conflicts)
    Conflict,

    // System Errors
    /// Persistence unavailable (retryable)
    DbUnavailable,
    /// Stored document could not be decoded
    DataCorruption,
    /// Internal server error
    Internal,
    /// Configuration error
    ConfigError,
}

impl ErrorCode {
    /// Returns the canonical SCREAMING_SNAKE_CASE string for this error code.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::UnauthorizedMissingBearer => "UNAUTHORIZED_MISSING_BEARER",
            Self::UnauthorizedInvalidJwt => "UNAUTHORIZED_INVALID_JWT",
            Self::UnauthorizedExpiredJwt => "UNAUTHORIZED_EXPIRED_JWT",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::UnknownParticipant => "UNKNOWN_PARTICIPANT",
            Self::CoordinatorOnly => "COORDINATOR_ONLY",

            Self::BadRequest => "BAD_REQUEST",
            Self::InvalidHeader => "INVALID_HEADER",
            Self::InvalidDraftId => "INVALID_DRAFT_ID",
            Self::InvalidItemId => "INVALID_ITEM_ID",
            Self::InvalidQuota => "INVALID_QUOTA",
            Self::NotInPool => "NOT_IN_POOL",
            Self::PoolTooSmall => "POOL_TOO_SMALL",
            Self::ValidationError => "VALIDATION_ERROR",

            Self::DraftNotFound => "DRAFT_NOT_FOUND",
            Self::NotFound => "NOT_FOUND",

            Self::NotYourTurn => "NOT_YOUR_TURN",
            Self::WrongActionKind => "WRONG_ACTION_KIND",
            Self::AlreadyResolved => "ALREADY_RESOLVED",
            Self::SessionComplete => "SESSION_COMPLETE",
            Self::StageMismatch => "STAGE_MISMATCH",
            Self::AlreadyReady => "ALREADY_READY",
            Self::NotAllReady => "NOT_ALL_READY",
            Self::DuplicateCandidate => "DUPLICATE_CANDIDATE",
            Self::DraftFull => "DRAFT_FULL",
            Self::SideTaken => "SIDE_TAKEN",
            Self::OptimisticLock => "OPTIMISTIC_LOCK",
            Self::Conflict => "CONFLICT",

            Self::DbUnavailable => "DB_UNAVAILABLE",
            Self::DataCorruption => "DATA_CORRUPTION",
            Self::Internal => "INTERNAL",
            Self::ConfigError => "CONFIG_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
