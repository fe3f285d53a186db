//! Application state shared across all request handlers.

use std::sync::Arc;

use crate::discovery::config::DiscoveryConfig;
use crate::discovery::error::DiscoveryError;
use crate::discovery::DiscoveryService;
use crate::storage::embedding::HashEmbedder;
use crate::storage::memory::MemoryStorage;
use crate::storage::Storage;

/// Shared application state.
pub struct AppState {
    /// Discovery orchestrator.
    pub discovery: DiscoveryService,
    /// Storage backend for imports and reads.
    pub storage: Arc<dyn Storage>,
    /// Embedder for imported descriptions.
    pub embedder: HashEmbedder,
    /// Pipeline configuration.
    pub config: DiscoveryConfig,
}

impl AppState {
    /// Create application state from configuration, backed by in-memory
    /// storage.
    ///
    /// # Errors
    /// Returns an error if the discovery service cannot be built.
    pub fn new(config: DiscoveryConfig) -> Result<Arc<Self>, DiscoveryError> {
        let discovery = DiscoveryService::new(config.clone())?;
        Ok(Arc::new(Self {
            discovery,
            storage: Arc::new(MemoryStorage::new()),
            embedder: HashEmbedder::new(),
            config,
        }))
    }

    /// Create application state with an explicit storage backend.
    ///
    /// # Errors
    /// Returns an error if the discovery service cannot be built.
    pub fn with_storage(
        config: DiscoveryConfig,
        storage: Arc<dyn Storage>,
    ) -> Result<Arc<Self>, DiscoveryError> {
        let discovery = DiscoveryService::new(config.clone())?;
        Ok(Arc::new(Self {
            discovery,
            storage,
            embedder: HashEmbedder::new(),
            config,
        }))
    }
}
