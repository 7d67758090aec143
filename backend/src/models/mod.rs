//! Data models shared across services and API handlers.

pub mod challenge;
pub mod device_session;
pub mod fingerprint;
