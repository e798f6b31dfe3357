//! Operation lifecycle: the issue and verify pipelines.

use crate::errors::{OperationError, Result};
use crate::identity::{IdentityExtractor, TokenDecoder};
use crate::store::OperationStore;
use crate::types::{CreateOutcome, DecodedIdentity, OperationRecord};
use uuid::Uuid;

/// Orchestrates issuing and verifying operation ids
///
/// Both operations are stateless single-pass pipelines: every failure is
/// terminal for the request and nothing is retried internally.
pub struct OperationService<D, S> {
    identity: IdentityExtractor<D>,
    store: S,
}

impl<D: TokenDecoder, S: OperationStore> OperationService<D, S> {
    pub fn new(identity: IdentityExtractor<D>, store: S) -> Self {
        Self { identity, store }
    }

    /// Extract and type-check the caller's identity from the raw
    /// `Authorization` header value
    ///
    /// Exposed separately so an adapter can run further request checks
    /// between authorization and the durable write of [`issue_for`].
    pub fn authorize(&self, auth_header: &str) -> Result<DecodedIdentity> {
        self.identity.extract_identity(auth_header)
    }

    /// Issue a fresh operation id bound to the caller's platform
    pub async fn issue(&self, auth_header: &str) -> Result<Uuid> {
        let identity = self.authorize(auth_header)?;
        self.issue_for(identity).await
    }

    /// Issue a fresh operation id for an already-authorized caller
    ///
    /// A conditional create that reports an existing record means either a
    /// v4 id collision or a replayed write; both surface as
    /// [`OperationError::IssuanceConflict`] rather than an in-band retry
    /// contract.
    pub async fn issue_for(&self, identity: DecodedIdentity) -> Result<Uuid> {
        let record = OperationRecord::issue(identity.platform_id);

        match self.store.create(&record).await? {
            CreateOutcome::Created => {
                tracing::info!(
                    operation_id = %record.id,
                    platform_id = %record.platform_id,
                    "operation issued"
                );
                Ok(record.id)
            }
            CreateOutcome::AlreadyExists => {
                tracing::error!(
                    operation_id = %record.id,
                    platform_id = %record.platform_id,
                    "freshly generated operation id already existed"
                );
                Err(OperationError::IssuanceConflict { id: record.id })
            }
        }
    }

    /// Verify that a presented operation id was issued to the caller
    ///
    /// An id owned by a different platform is reported as
    /// [`OperationError::OperationNotFound`], indistinguishable from a
    /// non-existent id, so a non-owner cannot probe which ids exist.
    pub async fn verify(&self, auth_header: &str, operation_header: Option<&str>) -> Result<()> {
        let identity = self.identity.extract_identity(auth_header)?;

        let operation_id = match operation_header {
            None | Some("") => return Err(OperationError::MissingOperationId),
            Some(value) => {
                Uuid::parse_str(value).map_err(|_| OperationError::InvalidOperationId)?
            }
        };

        let record = self
            .store
            .fetch(operation_id)
            .await?
            .ok_or(OperationError::OperationNotFound)?;

        if record.platform_id != identity.platform_id {
            tracing::warn!(
                operation_id = %operation_id,
                owner = %record.platform_id,
                caller = %identity.platform_id,
                "operation presented by a non-owning platform"
            );
            return Err(OperationError::OperationNotFound);
        }

        Ok(())
    }
}
