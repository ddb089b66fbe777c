// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Moderation rules live in domains/moderation and use these traits.
//
// Naming convention: Base* for trait names (e.g., BaseRemoteRuntime)

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::common::RemoteError;

// =============================================================================
// Remote Runtime Trait (Infrastructure - zome calls)
// =============================================================================

#[async_trait]
pub trait BaseRemoteRuntime: Send + Sync {
    /// Invoke `fn_name` in `zome` with a JSON payload, returning the decoded
    /// JSON result.
    ///
    /// Implementations report every transport problem (including a dropped
    /// connection) as a [`RemoteError`]; they never panic.
    async fn call_zome(&self, zome: &str, fn_name: &str, payload: Value)
        -> Result<Value, RemoteError>;

    /// Whether the connection is currently usable
    fn is_connected(&self) -> bool {
        true
    }
}

// =============================================================================
// Connector Trait (Infrastructure - establishing the runtime connection)
// =============================================================================

#[async_trait]
pub trait BaseConnector: Send + Sync {
    /// Attempt to open a connection to the remote runtime once
    async fn connect(&self) -> Result<Arc<dyn BaseRemoteRuntime>, RemoteError>;
}
