//! Domain types and token claim names.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT header claim carrying the token kind
pub const TOKEN_KIND_HEADER_CLAIM: &str = "tid";

/// JWT payload claim carrying the platform id
pub const PLATFORM_ID_CLAIM: &str = "idPlatform";

/// Token kind value accepted for identity extraction
pub const ACCESS_TOKEN_KIND: &str = "ACCESS";

/// Token kind value of refresh tokens, never accepted here
pub const REFRESH_TOKEN_KIND: &str = "REFRESH";

/// Kind of a bearer token, from the `tid` header claim
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Caller identity decoded from a bearer token
///
/// Request-scoped; never cached or persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedIdentity {
    pub platform_id: Uuid,
    pub token_kind: TokenKind,
}

/// An issued operation bound to its owning platform
///
/// At most one record exists per id; `platform_id` never changes after
/// creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationRecord {
    pub id: Uuid,
    pub platform_id: Uuid,
}

impl OperationRecord {
    /// Create a record with a fresh random id owned by `platform_id`
    pub fn issue(platform_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            platform_id,
        }
    }
}

/// Outcome of a conditional create in the operation store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    /// The record was inserted
    Created,
    /// A record with the same id already existed; nothing was written
    AlreadyExists,
}
