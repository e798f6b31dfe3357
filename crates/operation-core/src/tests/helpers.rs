//! Test helpers: hand-assembled tokens and store stubs.

use crate::*;
use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use operation_storage::{MemoryStorage, StorageError};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

fn encode_segment(value: &Value) -> String {
    URL_SAFE_NO_PAD.encode(serde_json::to_vec(value).unwrap())
}

/// Assemble a compact JWT from header and payload JSON; the signature
/// segment is filler since nothing here verifies it.
pub fn token_with(header: Value, claims: Value) -> String {
    format!(
        "{}.{}.{}",
        encode_segment(&header),
        encode_segment(&claims),
        URL_SAFE_NO_PAD.encode(b"sig")
    )
}

pub fn token_of_kind(kind: &str, platform_id: Uuid) -> String {
    token_with(
        json!({ "alg": "HS256", "typ": "JWT", TOKEN_KIND_HEADER_CLAIM: kind }),
        json!({ PLATFORM_ID_CLAIM: platform_id.to_string() }),
    )
}

pub fn access_token(platform_id: Uuid) -> String {
    token_of_kind(ACCESS_TOKEN_KIND, platform_id)
}

pub fn auth_header(token: &str) -> String {
    format!("Bearer {token}")
}

pub fn access_header(platform_id: Uuid) -> String {
    auth_header(&access_token(platform_id))
}

pub type TestService = OperationService<JwtDecoder, KvOperationStore<MemoryStorage>>;

pub fn test_service() -> TestService {
    let store = KvOperationStore::new(Arc::new(MemoryStorage::new()));
    OperationService::new(IdentityExtractor::new(), store)
}

/// Store whose every call fails with a driver error
pub struct FailingStore;

#[async_trait]
impl OperationStore for FailingStore {
    async fn create(&self, _record: &OperationRecord) -> Result<CreateOutcome> {
        Err(StorageError::Database("connection refused".to_string()).into())
    }

    async fn fetch(&self, _id: Uuid) -> Result<Option<OperationRecord>> {
        Err(StorageError::Database("connection refused".to_string()).into())
    }
}

/// Store that reports every create as a duplicate
pub struct ConflictingStore;

#[async_trait]
impl OperationStore for ConflictingStore {
    async fn create(&self, _record: &OperationRecord) -> Result<CreateOutcome> {
        Ok(CreateOutcome::AlreadyExists)
    }

    async fn fetch(&self, _id: Uuid) -> Result<Option<OperationRecord>> {
        Ok(None)
    }
}
