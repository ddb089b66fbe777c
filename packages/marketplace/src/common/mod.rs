// Common types and utilities shared across the marketplace domains

pub mod errors;
pub mod hash;
pub mod types;

pub use errors::{FailureKind, Operation, RemoteError, ServiceError, StoreError};
pub use hash::{Action, ActionHash, Agent, AgentPubKey, ContentHash, HASH_LEN};
pub use types::*;
