//! Operation store seam and its key-value implementation.

use crate::errors::Result;
use crate::types::{CreateOutcome, OperationRecord};
use async_trait::async_trait;
use operation_storage::{Storage, CF_OPERATIONS};
use std::sync::Arc;
use uuid::Uuid;

/// Durable store of issued operations
///
/// `create` must be atomic: under concurrent calls for the same id exactly
/// one caller observes [`CreateOutcome::Created`].
#[async_trait]
pub trait OperationStore: Send + Sync {
    /// Conditionally create a record, keyed by its id
    async fn create(&self, record: &OperationRecord) -> Result<CreateOutcome>;

    /// Fetch a record by id; absence is `Ok(None)`, never an error
    async fn fetch(&self, id: Uuid) -> Result<Option<OperationRecord>>;
}

/// [`OperationStore`] over the generic key-value layer
pub struct KvOperationStore<S> {
    storage: Arc<S>,
}

impl<S: Storage> KvOperationStore<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl<S: Storage> OperationStore for KvOperationStore<S> {
    async fn create(&self, record: &OperationRecord) -> Result<CreateOutcome> {
        let inserted = self
            .storage
            .put_if_absent(CF_OPERATIONS, &record.id, record)
            .await?;

        if inserted {
            Ok(CreateOutcome::Created)
        } else {
            Ok(CreateOutcome::AlreadyExists)
        }
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<OperationRecord>> {
        Ok(self.storage.get(CF_OPERATIONS, &id).await?)
    }
}
