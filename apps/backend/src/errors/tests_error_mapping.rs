// Unit tests for error mapping - pure domain logic without HTTP dependencies
use crate::errors::domain::{
    AuthorizationKind, ConflictKind, DomainError, InfraErrorKind, NotFoundKind, ValidationKind,
};
use crate::errors::ErrorCode;
use crate::AppError;

#[test]
fn maps_validation_to_4xx() {
    let de = DomainError::validation(ValidationKind::InvalidQuota, "quota too large");
    let app: AppError = de.into();
    assert_eq!(app.code(), ErrorCode::InvalidQuota);
    assert_eq!(app.status().as_u16(), 400);

    let de = DomainError::validation(ValidationKind::NotInPool, "unknown item");
    let app: AppError = de.into();
    assert_eq!(app.code(), ErrorCode::NotInPool);
    assert_eq!(app.status().as_u16(), 422);
}

#[test]
fn maps_authorization_to_403() {
    let de = DomainError::authorization(AuthorizationKind::UnknownParticipant, "who?");
    let app: AppError = de.into();
    assert_eq!(app.code(), ErrorCode::UnknownParticipant);
    assert_eq!(app.status().as_u16(), 403);

    let de = DomainError::authorization(AuthorizationKind::CoordinatorOnly, "side A only");
    let app: AppError = de.into();
    assert_eq!(app.code(), ErrorCode::CoordinatorOnly);
    assert_eq!(app.status().as_u16(), 403);
}

#[test]
fn maps_turn_conflicts_to_distinct_codes() {
    let cases = [
        (ConflictKind::NotYourTurn, "NOT_YOUR_TURN"),
        (ConflictKind::WrongActionKind, "WRONG_ACTION_KIND"),
        (ConflictKind::AlreadyResolved, "ALREADY_RESOLVED"),
        (ConflictKind::SessionComplete, "SESSION_COMPLETE"),
        (ConflictKind::OptimisticLock, "OPTIMISTIC_LOCK"),
        (ConflictKind::Other("x".into()), "CONFLICT"),
    ];
    for (kind, code) in cases {
        let app: AppError = DomainError::conflict(kind, "nope").into();
        assert_eq!(app.code().as_str(), code);
        assert_eq!(app.status().as_u16(), 409);
    }
}

#[test]
fn maps_not_found() {
    let app: AppError = DomainError::not_found(NotFoundKind::Draft, "no draft").into();
    assert_eq!(app.code(), ErrorCode::DraftNotFound);
    assert_eq!(app.status().as_u16(), 404);
}

#[test]
fn maps_infra_to_retryable_503() {
    let down = DomainError::infra(InfraErrorKind::DbUnavailable, "down");
    assert!(down.is_retryable());
    let app: AppError = down.into();
    assert_eq!(app.code(), ErrorCode::DbUnavailable);
    assert_eq!(app.status().as_u16(), 503);

    let corrupt: AppError = DomainError::infra(InfraErrorKind::DataCorruption, "bad json").into();
    assert_eq!(corrupt.code(), ErrorCode::DataCorruption);
    assert_eq!(corrupt.status().as_u16(), 500);
}
