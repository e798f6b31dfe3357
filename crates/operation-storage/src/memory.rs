//! In-memory storage backend
//!
//! Map-backed implementation of [`Storage`] for unit tests. Data is lost
//! on drop.

use crate::{
    errors::{Result, StorageError},
    traits::{deserialize_value, serialize_key, serialize_value, Storage},
};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage implementation
#[derive(Debug, Default)]
pub struct MemoryStorage {
    // (column family, key bytes) → value bytes
    entries: RwLock<HashMap<(String, Vec<u8>), Vec<u8>>>,
}

impl MemoryStorage {
    /// Create a new empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_poisoned() -> StorageError {
        StorageError::Database("memory storage lock poisoned".to_string())
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get<K, V>(&self, cf: &str, key: &K) -> Result<Option<V>>
    where
        K: Serialize + Send + Sync,
        V: DeserializeOwned,
    {
        let key_bytes = serialize_key(key)?;
        let entries = self.entries.read().map_err(|_| Self::lock_poisoned())?;

        match entries.get(&(cf.to_string(), key_bytes)) {
            Some(bytes) => Ok(Some(deserialize_value(bytes)?)),
            None => Ok(None),
        }
    }

    async fn put<K, V>(&self, cf: &str, key: &K, value: &V) -> Result<()>
    where
        K: Serialize + Send + Sync,
        V: Serialize + Send + Sync,
    {
        let key_bytes = serialize_key(key)?;
        let value_bytes = serialize_value(value)?;
        let mut entries = self.entries.write().map_err(|_| Self::lock_poisoned())?;

        entries.insert((cf.to_string(), key_bytes), value_bytes);
        Ok(())
    }

    async fn put_if_absent<K, V>(&self, cf: &str, key: &K, value: &V) -> Result<bool>
    where
        K: Serialize + Send + Sync,
        V: Serialize + Send + Sync,
    {
        let key_bytes = serialize_key(key)?;
        let value_bytes = serialize_value(value)?;
        let mut entries = self.entries.write().map_err(|_| Self::lock_poisoned())?;

        // Check and insert under one write lock, matching the conditional
        // write semantics of the RocksDB backend.
        match entries.entry((cf.to_string(), key_bytes)) {
            std::collections::hash_map::Entry::Occupied(_) => Ok(false),
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(value_bytes);
                Ok(true)
            }
        }
    }

    async fn exists<K>(&self, cf: &str, key: &K) -> Result<bool>
    where
        K: Serialize + Send + Sync,
    {
        let key_bytes = serialize_key(key)?;
        let entries = self.entries.read().map_err(|_| Self::lock_poisoned())?;

        Ok(entries.contains_key(&(cf.to_string(), key_bytes)))
    }

    async fn delete<K>(&self, cf: &str, key: &K) -> Result<()>
    where
        K: Serialize + Send + Sync,
    {
        let key_bytes = serialize_key(key)?;
        let mut entries = self.entries.write().map_err(|_| Self::lock_poisoned())?;

        entries.remove(&(cf.to_string(), key_bytes));
        Ok(())
    }
}
