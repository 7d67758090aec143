//! Ephemeral binding of a physical device to a challenge order.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{DeviceId, OrderId};

/// Script every page falls back to when no per-session asset is attached.
pub const DEFAULT_ASSET_NAME: &str = "fingerprinter_session.js";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Completed,
    Expired,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::Completed => "completed",
            SessionStatus::Expired => "expired",
        }
    }
}

/// Opaque reference to a generated fingerprinting script.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetRef(String);

impl AssetRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Name of the script generated for a single order.
    pub fn for_order(order_id: OrderId) -> Self {
        Self(format!("fingerprinter_{}.js", order_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The shared fallback script is never reclaimed on session teardown.
    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_ASSET_NAME
    }
}

impl Default for AssetRef {
    fn default() -> Self {
        Self(DEFAULT_ASSET_NAME.to_string())
    }
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A device session record. Values are never edited in place; updates build a
/// replacement and reinsert it under the same order key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSession {
    pub device_id: DeviceId,
    pub order_id: OrderId,
    pub created_at: DateTime<Utc>,
    pub status: SessionStatus,
    pub asset_ref: Option<AssetRef>,
}

impl DeviceSession {
    pub fn new(device_id: DeviceId, order_id: OrderId, created_at: DateTime<Utc>) -> Self {
        Self {
            device_id,
            order_id,
            created_at,
            status: SessionStatus::Active,
            asset_ref: None,
        }
    }

    pub fn with_asset(&self, asset_ref: AssetRef) -> Self {
        Self {
            asset_ref: Some(asset_ref),
            ..self.clone()
        }
    }

    pub fn with_status(self, status: SessionStatus) -> Self {
        Self { status, ..self }
    }

    /// A `max_age` reaching past the representable range never expires.
    pub fn is_expired_at(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        self.created_at
            .checked_add_signed(max_age)
            .is_some_and(|deadline| deadline <= now)
    }
}
