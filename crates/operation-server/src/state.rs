use anyhow::Result;
use operation_core::{IdentityExtractor, JwtDecoder, KvOperationStore, OperationService};
use operation_storage::RocksDbStorage;
use std::sync::Arc;

use crate::config::Config;
use crate::forms::FormsClient;

/// Operation service over the production storage backend
pub type Operations = OperationService<JwtDecoder, KvOperationStore<RocksDbStorage>>;

/// Application state shared across all handlers
pub struct AppState {
    pub config: Config,
    /// Raw storage handle, used by the readiness probe
    pub storage: Arc<RocksDbStorage>,
    pub operations: Operations,
    /// Forms proxy, present only when a forms service URL is configured
    pub forms: Option<FormsClient>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let storage = Arc::new(RocksDbStorage::open(&config.database_path)?);

        let operations = OperationService::new(
            IdentityExtractor::new(),
            KvOperationStore::new(Arc::clone(&storage)),
        );

        let forms = config.forms_url.clone().map(FormsClient::new);

        Ok(AppState {
            config,
            storage,
            operations,
            forms,
        })
    }
}
