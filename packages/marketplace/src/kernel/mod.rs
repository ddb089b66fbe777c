//! Kernel module - remote runtime infrastructure and dependencies.

pub mod connection;
pub mod deps;
pub mod test_dependencies;
pub mod traits;
pub mod zome;

pub use connection::{connect_with_retry, RetryPolicy};
pub use deps::{AppContext, MarketplaceDeps};
pub use test_dependencies::{InMemoryConnector, InMemoryRuntime, ZomeCall};
pub use traits::*;
pub use zome::ZomeFunctions;
