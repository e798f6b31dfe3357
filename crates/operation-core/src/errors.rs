//! Failure taxonomy of the operation token lifecycle.
//!
//! Every failure is a typed, terminal result at the point of detection.
//! The HTTP layer maps each variant to a status, a stable error code and,
//! for authentication failures, a `WWW-Authenticate` challenge.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum OperationError {
    #[error("There is not the authentication header")]
    NoAuthHeader,

    #[error("Invalid type of the authentication header, expected 'Bearer'")]
    WrongHeaderScheme,

    #[error("The authentication token is empty")]
    EmptyToken,

    #[error("Invalid the auth token")]
    MalformedToken,

    #[error("Invalid type of the auth token")]
    WrongTokenKind,

    #[error("Missing the platform id")]
    MissingIdentityClaim,

    #[error("Invalid the platform id")]
    MalformedIdentityClaim,

    #[error("Missing the operation id")]
    MissingOperationId,

    #[error("Invalid the operation id")]
    InvalidOperationId,

    #[error("Operation not found")]
    OperationNotFound,

    /// An operation id generated at issuance already existed in the store.
    /// Either an id collision or a replayed write; not self-healable by
    /// the caller.
    #[error("Operation id '{id}' was already issued")]
    IssuanceConflict { id: Uuid },

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] operation_storage::StorageError),
}

pub type Result<T> = std::result::Result<T, OperationError>;
