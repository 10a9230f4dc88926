use std::sync::Arc;

use tracing::info;

use crate::admin::AttachLocks;
use crate::backend::{ListingBackend, MemoryBackend, SupabaseBackend};
use crate::config::{BackendKind, Config};

pub struct AppState {
    pub backend: Arc<dyn ListingBackend>,
    /// Base URL public image links are built from
    pub public_url: String,
    /// Origins for the CORS layer, empty means any
    pub allowed_origins: Vec<String>,
    pub attach_locks: AttachLocks,
}

impl AppState {
    pub fn from_config(config: &Config) -> anyhow::Result<Arc<Self>> {
        let backend: Arc<dyn ListingBackend> = match config.backend.kind {
            BackendKind::Supabase => Arc::new(SupabaseBackend::new(&config.backend)?),
            BackendKind::Memory => Arc::new(MemoryBackend::new()),
        };
        info!("Using {} backend at {}", backend.backend_name(), config.backend.url);

        Ok(Self::new(
            backend,
            &config.backend.url,
            config.server.allowed_origins.clone(),
        ))
    }

    pub fn new(
        backend: Arc<dyn ListingBackend>,
        public_url: &str,
        allowed_origins: Vec<String>,
    ) -> Arc<Self> {
        Arc::new(Self {
            backend,
            public_url: public_url.trim_end_matches('/').to_string(),
            allowed_origins,
            attach_locks: AttachLocks::new(),
        })
    }

    /// State that accepts requests from any origin
    pub fn with_backend(backend: Arc<dyn ListingBackend>, public_url: &str) -> Arc<Self> {
        Self::new(backend, public_url, Vec::new())
    }
}
