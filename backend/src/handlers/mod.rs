pub mod challenge;
pub mod fingerprints;
pub mod health;

pub use challenge::*;
pub use fingerprints::*;
pub use health::*;

#[cfg(test)]
pub(crate) fn test_state(
    assets: crate::services::asset_store::MockAssetStore,
    upstream: crate::services::upstream::MockUpstreamClient,
) -> crate::state::AppState {
    use std::sync::Arc;

    crate::state::AppState::new(
        Arc::new(assets),
        Arc::new(upstream),
        crate::config::Config::for_tests(),
    )
}
