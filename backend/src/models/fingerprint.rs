//! Fingerprint submissions collected during a scoring round, and the score
//! computed over them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;
use validator::Validate;

use crate::validation::rules;

/// One submission in the current round, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FingerprintRecord {
    /// Device label within the round. Unrelated to the session `device_id`.
    pub device_label: String,
    pub fingerprint_hash: String,
}

impl FingerprintRecord {
    pub fn new(device_label: impl Into<String>, fingerprint_hash: impl Into<String>) -> Self {
        Self {
            device_label: device_label.into(),
            fingerprint_hash: fingerprint_hash.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
/// Payload for adding a fingerprint to the current scoring round.
pub struct CollectFingerprintPayload {
    #[validate(length(min = 1, max = 128))]
    pub device_label: String,
    #[validate(
        length(min = 2, max = 128),
        custom(function = "rules::validate_fingerprint_hash")
    )]
    pub fingerprint: String,
}

impl From<CollectFingerprintPayload> for FingerprintRecord {
    fn from(payload: CollectFingerprintPayload) -> Self {
        Self {
            device_label: payload.device_label,
            fingerprint_hash: payload.fingerprint,
        }
    }
}

/// How many devices landed in each classification bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ScoreBreakdown {
    pub correct: usize,
    pub fragmentations: usize,
    pub collisions: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ScoringResult {
    /// Score in `[0, 1]` per device label.
    pub per_device_scores: BTreeMap<String, f64>,
    /// Mean device score, rounded to three decimals.
    pub aggregate_score: f64,
    pub breakdown: ScoreBreakdown,
}
