//! HTTP delivery of custom-resource responses.
//!
//! CloudFormation hands every request a pre-signed S3 URL; the response is
//! the JSON document PUT to that URL. The signature does not cover a content
//! type, so the request is sent with an empty `Content-Type`.

use std::time::Duration;

use anyhow::{Context, bail};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use tracing::debug;

use bpa_guard_model::CustomResourceResponse;

use crate::collaborators::ResponseSink;

/// [`ResponseSink`] that PUTs the response with `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpResponseSink {
    client: reqwest::Client,
}

impl HttpResponseSink {
    /// Create a sink whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ResponseSink for HttpResponseSink {
    async fn deliver(&self, url: &str, response: &CustomResourceResponse) -> anyhow::Result<()> {
        let body = serde_json::to_vec(response).context("failed to serialize response")?;
        debug!(bytes = body.len(), "sending response");

        let reply = self
            .client
            .put(url)
            .header(CONTENT_TYPE, "")
            .body(body)
            .send()
            .await
            .context("response PUT failed")?;

        let status = reply.status();
        if !status.is_success() {
            let detail = reply.text().await.unwrap_or_default();
            bail!("response endpoint returned {status}: {detail}");
        }
        debug!(%status, "response accepted");
        Ok(())
    }
}
