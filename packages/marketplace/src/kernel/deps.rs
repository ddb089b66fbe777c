//! Application dependencies (using traits for testability)
//!
//! `MarketplaceDeps` carries the infrastructure; `AppContext` is built from it
//! once at startup and handed to whatever needs the stores. There is no global
//! instance: two contexts built from two runtimes never share state.

use std::sync::Arc;

use super::connection::connect_with_retry;
use super::traits::{BaseConnector, BaseRemoteRuntime};
use crate::common::RemoteError;
use crate::config::Config;
use crate::domains::mediums_of_exchange::MediumsOfExchangeStore;
use crate::domains::service_types::ServiceTypesStore;

// =============================================================================
// MarketplaceDeps
// =============================================================================

#[derive(Clone)]
pub struct MarketplaceDeps {
    pub runtime: Arc<dyn BaseRemoteRuntime>,
    pub config: Config,
}

impl MarketplaceDeps {
    pub fn new(runtime: Arc<dyn BaseRemoteRuntime>, config: Config) -> Self {
        Self { runtime, config }
    }

    /// Wait for the remote runtime using the configured retry policy.
    pub async fn connect(connector: &dyn BaseConnector, config: Config) -> Result<Self, RemoteError> {
        let runtime = connect_with_retry(connector, &config.retry_policy()).await?;
        Ok(Self::new(runtime, config))
    }
}

// =============================================================================
// AppContext
// =============================================================================

/// One store per moderated domain, sharing a single runtime connection
#[derive(Clone)]
pub struct AppContext {
    pub deps: MarketplaceDeps,
    pub service_types: Arc<ServiceTypesStore>,
    pub mediums_of_exchange: Arc<MediumsOfExchangeStore>,
}

impl AppContext {
    pub fn new(deps: MarketplaceDeps) -> Self {
        let options = deps.config.store_options();
        let service_types = Arc::new(ServiceTypesStore::new(deps.runtime.clone(), options.clone()));
        let mediums_of_exchange = Arc::new(MediumsOfExchangeStore::new(deps.runtime.clone(), options));

        tracing::info!(
            cache_ttl_secs = deps.config.cache_ttl.as_secs(),
            strict_transitions = deps.config.strict_transitions,
            "Marketplace context ready"
        );

        Self {
            deps,
            service_types,
            mediums_of_exchange,
        }
    }

    pub async fn connect(connector: &dyn BaseConnector, config: Config) -> Result<Self, RemoteError> {
        Ok(Self::new(MarketplaceDeps::connect(connector, config).await?))
    }

    pub fn is_connected(&self) -> bool {
        self.deps.runtime.is_connected()
    }
}
