use anyhow::anyhow;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::{env, net::SocketAddr, str::FromStr};

use crate::services::scoring::ScoringConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub bind_addr: SocketAddr,
    /// Key callers must present in `X-API-Key` on protected routes.
    pub api_key: String,
    pub challenge_base_url: String,
    pub challenge_api_key: String,
    pub upstream_timeout_seconds: u64,
    pub asset_dir: String,
    /// Unset keeps sessions until they are explicitly completed.
    pub session_ttl_seconds: Option<u64>,
    pub session_sweep_interval_seconds: u64,
    pub cors_allow_origins: Vec<String>,
    pub scoring: ScoringConfig,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_addr: SocketAddr = bind_addr
            .parse()
            .map_err(|_| anyhow!("Invalid BIND_ADDR value: {}", bind_addr))?;

        let api_key =
            env::var("API_KEY").unwrap_or_else(|_| "change-this-api-key-in-production".to_string());

        let challenge_base_url = env::var("CHALLENGE_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8000".to_string());
        let challenge_api_key = env::var("CHALLENGE_API_KEY").unwrap_or_default();

        let asset_dir = env::var("ASSET_DIR").unwrap_or_else(|_| "./static/js".to_string());

        let defaults = ScoringConfig::default();
        let scoring = ScoringConfig {
            fragmentation_threshold: parse_env(
                "SCORING_FRAGMENTATION_THRESHOLD",
                defaults.fragmentation_threshold,
            )?,
            fragmentation_penalty: parse_env(
                "SCORING_FRAGMENTATION_PENALTY",
                defaults.fragmentation_penalty,
            )?,
            collision_penalty: parse_env("SCORING_COLLISION_PENALTY", defaults.collision_penalty)?,
        };
        validate_scoring(&scoring)?;

        let session_ttl_seconds: Option<u64> = parse_optional_env("SESSION_TTL_SECONDS")?;
        if let Some(seconds) = session_ttl_seconds {
            ttl_duration(seconds)?;
        }

        Ok(Config {
            bind_addr,
            api_key,
            challenge_base_url,
            challenge_api_key,
            upstream_timeout_seconds: parse_env("UPSTREAM_TIMEOUT_SECONDS", 10)?,
            asset_dir,
            session_ttl_seconds,
            session_sweep_interval_seconds: parse_env("SESSION_SWEEP_INTERVAL_SECONDS", 60)?,
            cors_allow_origins: parse_origins(env::var("CORS_ALLOW_ORIGINS").ok()),
            scoring,
        })
    }

    /// Session TTL as a duration, `None` when expiry is disabled.
    pub fn session_ttl(&self) -> anyhow::Result<Option<Duration>> {
        self.session_ttl_seconds.map(ttl_duration).transpose()
    }

    #[cfg(any(test, feature = "test-utils"))]
    pub fn for_tests() -> Self {
        Config {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            api_key: "test-api-key".into(),
            challenge_base_url: "http://challenger.test".into(),
            challenge_api_key: "challenger-key".into(),
            upstream_timeout_seconds: 1,
            asset_dir: "./static/js".into(),
            session_ttl_seconds: None,
            session_sweep_interval_seconds: 60,
            cors_allow_origins: Vec::new(),
            scoring: ScoringConfig::default(),
        }
    }
}

fn ttl_duration(seconds: u64) -> anyhow::Result<Duration> {
    i64::try_from(seconds)
        .ok()
        .and_then(Duration::try_seconds)
        .ok_or_else(|| anyhow!("Invalid SESSION_TTL_SECONDS value: {} is too large", seconds))
}

fn validate_scoring(scoring: &ScoringConfig) -> anyhow::Result<()> {
    if scoring.fragmentation_threshold < 1 {
        return Err(anyhow!(
            "Invalid SCORING_FRAGMENTATION_THRESHOLD value: {} (must be at least 1)",
            scoring.fragmentation_threshold
        ));
    }
    for (name, penalty) in [
        ("SCORING_FRAGMENTATION_PENALTY", scoring.fragmentation_penalty),
        ("SCORING_COLLISION_PENALTY", scoring.collision_penalty),
    ] {
        if !(0.0..=1.0).contains(&penalty) {
            return Err(anyhow!(
                "Invalid {} value: {} (must be within 0..=1)",
                name,
                penalty
            ));
        }
    }
    Ok(())
}

fn parse_env<T: FromStr>(name: &str, default: T) -> anyhow::Result<T> {
    Ok(parse_optional_env(name)?.unwrap_or(default))
}

fn parse_optional_env<T: FromStr>(name: &str) -> anyhow::Result<Option<T>> {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| anyhow!("Invalid {} value: {}", name, raw)),
        _ => Ok(None),
    }
}

fn parse_origins(raw: Option<String>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(',')
            .map(|origin| origin.trim().trim_end_matches('/').to_string())
            .filter(|origin| !origin.is_empty())
            .collect()
    })
    .unwrap_or_default()
}
