//! Wiring between configuration, the state store and the aggregation service.

use anyhow::{Context, Result};
use spectrum_core::{
    AggregationService, AggregatorClient, KeyValueStore, Orchestrator, ProviderCatalog, SqliteStore,
};
use std::sync::Arc;
use tracing::debug;

use crate::config::Config;
use crate::render;

/// Open the persisted state store.
pub fn open_store(config: &Config) -> Result<Arc<dyn KeyValueStore>> {
    let path = config.paths.state_db();
    let store = SqliteStore::open_path(&path).with_context(|| {
        format!(
            "Failed to open state store at {}",
            path.display()
        )
    })?;
    Ok(Arc::new(store))
}

pub fn client(config: &Config) -> Result<AggregatorClient> {
    debug!("Aggregation service at {}", config.api.url);
    AggregatorClient::new(config.api.url.clone(), config.timeout())
        .context("Failed to create aggregation client")
}

/// Orchestrator backed by the live provider catalog.
pub async fn connect(config: &Config) -> Result<Orchestrator> {
    let store = open_store(config)?;
    let service: Arc<dyn AggregationService> = Arc::new(client(config)?);

    let spinner = render::spinner("Loading providers...");
    let result = Orchestrator::connect(service, store, config.orchestrator()).await;
    spinner.finish_and_clear();

    result.with_context(|| format!("Cannot reach aggregation service at {}", config.api.url))
}

/// Orchestrator over persisted state only, for commands that never query.
///
/// The catalog is empty, so provider names fall back to their ids.
pub fn offline(config: &Config) -> Result<Orchestrator> {
    let store = open_store(config)?;
    let service: Arc<dyn AggregationService> = Arc::new(client(config)?);
    Ok(Orchestrator::new(
        service,
        store,
        ProviderCatalog::default(),
        config.orchestrator(),
    )?)
}
