//! Device-identity fraud scoring over a snapshot of fingerprint submissions.
//!
//! Two failure modes are penalised:
//! - fragmentation: one device label reporting several distinct fingerprints
//! - collision: one fingerprint reported by several device labels
//!
//! Scoring is a pure function of its input and never touches shared state.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::models::fingerprint::{FingerprintRecord, ScoreBreakdown, ScoringResult};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Distinct fingerprint count at or above which a device scores zero.
    pub fragmentation_threshold: usize,
    /// Deducted per extra distinct fingerprint below the threshold.
    pub fragmentation_penalty: f64,
    /// Deducted for exactly one colliding submission.
    pub collision_penalty: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            fragmentation_threshold: 3,
            fragmentation_penalty: 0.3,
            collision_penalty: 0.25,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Correct,
    Fragmentation,
    Collision,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceVerdict {
    pub points: f64,
    pub classification: Classification,
}

pub fn score(records: &[FingerprintRecord], cfg: &ScoringConfig) -> ScoringResult {
    if records.is_empty() {
        return ScoringResult::default();
    }

    let mut submissions: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    let mut owners: HashMap<&str, HashSet<&str>> = HashMap::new();
    for record in records {
        let label = record.device_label.as_str();
        let hash = record.fingerprint_hash.as_str();
        submissions.entry(label).or_default().push(hash);
        owners.entry(hash).or_default().insert(label);
    }

    let mut result = ScoringResult::default();
    for (label, hashes) in &submissions {
        let verdict = judge_device(hashes, &owners, cfg);
        match verdict.classification {
            Classification::Correct => result.breakdown.correct += 1,
            Classification::Fragmentation => result.breakdown.fragmentations += 1,
            Classification::Collision => result.breakdown.collisions += 1,
        }
        result
            .per_device_scores
            .insert((*label).to_string(), verdict.points);
    }

    let total: f64 = result.per_device_scores.values().sum();
    let mean = total / submissions.len() as f64;
    result.aggregate_score = round3(mean.clamp(0.0, 1.0));

    tracing::debug!(
        devices = submissions.len(),
        submissions = records.len(),
        aggregate_score = result.aggregate_score,
        correct = result.breakdown.correct,
        fragmentations = result.breakdown.fragmentations,
        collisions = result.breakdown.collisions,
        "Scored fingerprint round"
    );
    result
}

/// Scores one device's submissions against the round-wide owner index.
///
/// A device zeroed for fragmentation is final; only a device with points
/// left is checked for collisions, and a collision overrides `Correct`.
pub fn judge_device(
    hashes: &[&str],
    owners: &HashMap<&str, HashSet<&str>>,
    cfg: &ScoringConfig,
) -> DeviceVerdict {
    let mut points = 1.0_f64;
    let mut classification = Classification::Correct;

    let unique = hashes.iter().collect::<HashSet<_>>().len();
    if unique >= cfg.fragmentation_threshold {
        points = 0.0;
        classification = Classification::Fragmentation;
    } else if unique > 1 {
        points -= cfg.fragmentation_penalty * (unique - 1) as f64;
        classification = Classification::Fragmentation;
    }

    if points > 0.0 {
        let strikes = hashes
            .iter()
            .filter(|hash| owners.get(*hash).is_some_and(|labels| labels.len() > 1))
            .count();
        if strikes >= 2 {
            points = 0.0;
            classification = Classification::Collision;
        } else if strikes == 1 {
            points -= cfg.collision_penalty;
            classification = Classification::Collision;
        }
    }

    DeviceVerdict {
        points: points.max(0.0),
        classification,
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
