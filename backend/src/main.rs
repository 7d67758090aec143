use std::{sync::Arc, time::Duration};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use challenge_backend::{
    config::Config,
    routes,
    services::{
        asset_store::{AssetStore, FsAssetStore},
        session_sweeper::spawn_session_sweeper,
        upstream::{HttpUpstreamClient, UpstreamClient},
    },
    state::AppState,
};

fn mask_secret(s: &str) -> String {
    if s.is_empty() {
        return "<empty>".into();
    }
    let prefix = s.chars().take(4).collect::<String>();
    format!("{}*** (len={})", prefix, s.len())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "challenge_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::load()?;
    tracing::info!(
        bind_addr = %config.bind_addr,
        api_key = %mask_secret(&config.api_key),
        challenge_base_url = %config.challenge_base_url,
        challenge_api_key = %mask_secret(&config.challenge_api_key),
        asset_dir = %config.asset_dir,
        session_ttl_seconds = ?config.session_ttl_seconds,
        scoring = ?config.scoring,
        "Loaded configuration from environment/.env"
    );

    let assets: Arc<dyn AssetStore> = Arc::new(FsAssetStore::new(&config.asset_dir));
    let upstream: Arc<dyn UpstreamClient> = Arc::new(HttpUpstreamClient::new(
        &config.challenge_base_url,
        config.challenge_api_key.clone(),
        Duration::from_secs(config.upstream_timeout_seconds),
    )?);
    let state = AppState::new(assets, upstream, config.clone());

    if let Some(ttl) = config.session_ttl()? {
        let interval = Duration::from_secs(config.session_sweep_interval_seconds.max(1));
        spawn_session_sweeper(state.sessions.clone(), state.assets.clone(), ttl, interval);
        tracing::info!(?interval, "Session expiry sweep enabled");
    }

    let app = routes::app(state);

    // Start server
    tracing::info!("Server listening on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
