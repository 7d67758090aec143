use std::sync::Arc;

use crate::{
    config::Config,
    services::{
        asset_store::AssetStore, fingerprint_collector::FingerprintCollector,
        session_registry::SessionRegistry, upstream::UpstreamClient,
    },
};

/// Shared service state injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionRegistry>,
    pub fingerprints: Arc<FingerprintCollector>,
    pub assets: Arc<dyn AssetStore>,
    pub upstream: Arc<dyn UpstreamClient>,
    pub config: Config,
}

impl AppState {
    pub fn new(
        assets: Arc<dyn AssetStore>,
        upstream: Arc<dyn UpstreamClient>,
        config: Config,
    ) -> Self {
        Self {
            sessions: Arc::new(SessionRegistry::new()),
            fingerprints: Arc::new(FingerprintCollector::new()),
            assets,
            upstream,
            config,
        }
    }
}
