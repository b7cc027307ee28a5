//! The HTTP control surface: router construction plus handlers, and the
//! shared state they close over.

pub mod http;
pub mod run;

use std::sync::Arc;

use gargamel_gc::GcClientFactory;

use crate::registry::GameRegistry;
use crate::session::state::TimingConfig;

/// Cloned into every handler via axum's `State` extractor; cheap, `Arc`-backed.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<GameRegistry>,
    pub gc_factory: Arc<dyn GcClientFactory>,
    pub http_client: reqwest::Client,
    pub timing: TimingConfig,
}

impl AppState {
    pub fn new(gc_factory: Arc<dyn GcClientFactory>, timing: TimingConfig) -> Self {
        Self {
            registry: Arc::new(GameRegistry::new()),
            gc_factory,
            http_client: reqwest::Client::new(),
            timing,
        }
    }
}
