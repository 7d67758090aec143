//! Client for the upstream challenger service that validates fingerprints.

use anyhow::Context;
use async_trait::async_trait;
use std::time::Duration;
use tracing::Instrument;

use crate::models::challenge::FingerprintPayload;

pub const API_KEY_HEADER: &str = "x-api-key";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// Forwards a fingerprint; a non-success status is an error.
    async fn submit_fingerprint(&self, payload: &FingerprintPayload) -> anyhow::Result<()>;
}

pub struct HttpUpstreamClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl HttpUpstreamClient {
    pub fn new(base_url: &str, api_key: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("build upstream http client")?;
        Ok(Self {
            client,
            endpoint: fingerprint_endpoint(base_url),
            api_key,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn fingerprint_endpoint(base_url: &str) -> String {
    format!("{}/_fingerprint", base_url.trim_end_matches('/'))
}

#[async_trait]
impl UpstreamClient for HttpUpstreamClient {
    async fn submit_fingerprint(&self, payload: &FingerprintPayload) -> anyhow::Result<()> {
        let span = tracing::debug_span!("upstream_submit_fingerprint", order_id = %payload.order_id);

        async {
            self.client
                .post(&self.endpoint)
                .header(API_KEY_HEADER, &self.api_key)
                .json(payload)
                .send()
                .await
                .with_context(|| format!("send fingerprint to {}", self.endpoint))?
                .error_for_status()
                .context("upstream rejected fingerprint")
        }
        .instrument(span)
        .await?;
        Ok(())
    }
}
