pub mod asset_store;
pub mod fingerprint_collector;
pub mod scoring;
pub mod session_registry;
pub mod session_sweeper;
pub mod upstream;
