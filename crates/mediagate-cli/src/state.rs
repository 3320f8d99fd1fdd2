//! Application state

use crate::config::{GatewayConfig, StoreBackend};
use crate::gate::EdgePolicy;
use mediagate_store::{
    FsObjectStore, HttpObjectStore, HttpStoreConfig, MemoryObjectStore, ObjectStore,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Application state shared across handlers
pub struct AppState {
    /// Gateway configuration
    pub config: GatewayConfig,
    /// Referer allowlist and response policy
    pub policy: EdgePolicy,
    /// Bucket the gate reads from
    pub store: Arc<dyn ObjectStore>,
}

impl AppState {
    /// Create a new application state, opening the configured bucket
    pub async fn new(config: GatewayConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn ObjectStore> = match config.store {
            StoreBackend::Memory => {
                warn!("⚠ Storage mode: In-memory (empty, for development only)");
                Arc::new(MemoryObjectStore::new())
            }
            StoreBackend::Fs => {
                let dir = config.bucket_dir();
                let store = FsObjectStore::open(&dir).await?;
                info!("✓ Storage mode: bucket directory {}", dir.display());
                Arc::new(store)
            }
            StoreBackend::Http => {
                let store = HttpObjectStore::new(HttpStoreConfig {
                    base_url: config.bucket_url(),
                    timeout: Duration::from_secs(config.upstream_timeout_secs),
                })?;
                info!("✓ Storage mode: remote bucket {}", config.bucket_url());
                Arc::new(store)
            }
        };

        Ok(Self::with_store(config, store))
    }

    /// Create state around an existing store
    pub fn with_store(config: GatewayConfig, store: Arc<dyn ObjectStore>) -> Self {
        let policy = EdgePolicy::from_config(&config);
        if policy.allowed_origins.is_empty() {
            warn!("No allowed Referer hosts configured; only direct and trusted-client requests will be served");
        } else {
            info!("Allowing {} Referer host(s)", policy.allowed_origins.len());
        }

        Self {
            config,
            policy,
            store,
        }
    }
}
