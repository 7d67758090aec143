//! Optional periodic expiry of sessions that were never completed.
//!
//! Only started when a session TTL is configured; without it orphaned
//! sessions stay resident until explicitly deleted.

use chrono::{Duration, Utc};
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::services::{asset_store::AssetStore, session_registry::SessionRegistry};

/// Expires stale sessions and reclaims their generated assets.
pub async fn sweep_expired_sessions(
    registry: &SessionRegistry,
    assets: &dyn AssetStore,
    ttl: Duration,
) -> usize {
    let expired = registry.expire_older_than(ttl, Utc::now());
    for session in &expired {
        tracing::info!(
            device_id = %session.device_id,
            order_id = %session.order_id,
            status = session.status.as_str(),
            "Expired device session"
        );
        let Some(asset) = session.asset_ref.as_ref().filter(|a| !a.is_default()) else {
            continue;
        };
        if let Err(err) = assets.delete(asset).await {
            tracing::warn!(asset = %asset, error = ?err, "Failed to delete expired asset");
        }
    }
    expired.len()
}

pub fn spawn_session_sweeper(
    registry: Arc<SessionRegistry>,
    assets: Arc<dyn AssetStore>,
    ttl: Duration,
    interval: std::time::Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let removed = sweep_expired_sessions(&registry, assets.as_ref(), ttl).await;
            if removed > 0 {
                tracing::info!("Expired {} device sessions", removed);
            }
        }
    })
}
