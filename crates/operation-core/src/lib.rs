//! # operation-core
//!
//! Operation token lifecycle: extract the caller's platform identity from
//! a bearer JWT, issue an operation id bound to that identity, and verify
//! that a presented operation id belongs to the presenting platform.

#![warn(clippy::all)]

pub mod errors;
pub mod identity;
pub mod service;
pub mod store;
pub mod types;


pub use errors::{OperationError, Result};
pub use identity::{IdentityExtractor, JwtDecoder, RawToken, TokenDecoder};
pub use service::OperationService;
pub use store::{KvOperationStore, OperationStore};
pub use types::*;
