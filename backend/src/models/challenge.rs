//! Payloads and query parameters of the device challenge endpoints.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    types::{DeviceId, OrderId},
    validation::rules,
};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
/// Binds a physical device to a challenge order.
pub struct DeviceSessionPayload {
    #[schema(value_type = u64)]
    pub device_id: DeviceId,
    #[schema(value_type = u64)]
    pub order_id: OrderId,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
/// System-provided fingerprinting script for one order.
pub struct FingerprinterPayload {
    #[validate(
        length(min = 2, message = "fingerprinter_js is too short"),
        custom(function = "rules::validate_script_lines")
    )]
    pub fingerprinter_js: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
/// Fingerprint computed by the device and forwarded to the challenger.
pub struct FingerprintPayload {
    #[schema(value_type = u64)]
    #[validate(custom(function = "rules::validate_public_order_id"))]
    pub order_id: OrderId,
    #[validate(
        length(min = 2, max = 128),
        custom(function = "rules::validate_fingerprint_hash")
    )]
    pub fingerprint: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 128))]
    pub device_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OrderQuery {
    #[param(value_type = u64, maximum = 999999)]
    #[validate(custom(function = "rules::validate_public_order_id"))]
    pub order_id: OrderId,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DeviceQuery {
    #[param(value_type = u64)]
    pub device_id: DeviceId,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub active_sessions: usize,
    pub collected_fingerprints: usize,
}
