//! Test harness wiring an `AppContext` against the in-memory runtime.
//!
//! Every harness gets its own runtime unless one is shared explicitly, so
//! tests never observe each other's records.

use std::sync::Arc;

use marketplace_core::domains::mediums_of_exchange::MediumsOfExchangeStore;
use marketplace_core::domains::service_types::ServiceTypesStore;
use marketplace_core::kernel::{AppContext, InMemoryRuntime, MarketplaceDeps};
use marketplace_core::Config;

pub fn init_tracing() {
    // Run tests with: RUST_LOG=debug cargo test -- --nocapture
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub struct TestHarness {
    pub runtime: Arc<InMemoryRuntime>,
    pub context: AppContext,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self::with_runtime(Arc::new(InMemoryRuntime::marketplace()), config)
    }

    /// Harness on an existing runtime, e.g. to model a second client.
    pub fn with_runtime(runtime: Arc<InMemoryRuntime>, config: Config) -> Self {
        init_tracing();
        let context = AppContext::new(MarketplaceDeps::new(runtime.clone(), config));
        Self { runtime, context }
    }

    /// Another client of the same runtime, with empty local state.
    pub fn second_client(&self) -> Self {
        Self::with_runtime(self.runtime.clone(), self.context.deps.config.clone())
    }

    pub fn service_types(&self) -> &ServiceTypesStore {
        &self.context.service_types
    }

    pub fn mediums(&self) -> &MediumsOfExchangeStore {
        &self.context.mediums_of_exchange
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
