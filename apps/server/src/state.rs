//! Shared application state

use crate::{config::Config, sync::SyncService};
use bridge_registry::{HttpRegistryClient, RegistryClient};
use bridge_store::{DocumentStore, HttpDocumentStore};
use bridge_translate::TranslationService;
use std::sync::Arc;

/// Shared application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn DocumentStore>,
    pub translator: Arc<TranslationService>,
    pub sync: Arc<SyncService>,
}

impl AppState {
    /// Initialize the application state
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let store: Arc<dyn DocumentStore> = Arc::new(HttpDocumentStore::new(
            config.store.base_url.clone(),
            config.store_timeout(),
        )?);
        let registry: Arc<dyn RegistryClient> = Arc::new(HttpRegistryClient::new(
            config.registry.base_url.clone(),
            &config.registry.username,
            &config.registry.password,
            config.registry_timeout(),
        )?);
        Ok(Self::with_collaborators(config, store, registry))
    }

    /// Wire the state from explicit collaborators. Tests substitute fakes
    /// through this constructor.
    pub fn with_collaborators(
        config: Config,
        store: Arc<dyn DocumentStore>,
        registry: Arc<dyn RegistryClient>,
    ) -> Self {
        let translator = Arc::new(TranslationService::new(store.clone(), registry.clone()));
        let sync = Arc::new(SyncService::new(registry, store.clone()));
        Self {
            config: Arc::new(config),
            store,
            translator,
            sync,
        }
    }
}
