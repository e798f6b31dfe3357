//! # operation-storage
//!
//! Durable key-value layer for the operation token service.
//!
//! Exposes a narrow [`Storage`] interface over RocksDB column families,
//! including the conditional-write primitive (`put_if_absent`) the
//! operation lifecycle relies on for at-most-one record per id.

#![warn(clippy::all)]

pub mod column_families;
pub mod errors;
pub mod memory;
pub mod rocksdb_impl;
pub mod traits;

pub use column_families::*;
pub use errors::{Result, StorageError};
pub use memory::MemoryStorage;
pub use rocksdb_impl::RocksDbStorage;
pub use traits::Storage;
