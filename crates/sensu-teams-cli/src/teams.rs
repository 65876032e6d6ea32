//! Delivery of message cards to a Teams incoming webhook.

use anyhow::{Context, Result};
use reqwest::Client;
use sensu_teams_core::MessageCard;
use std::time::Duration;
use tracing::debug;

pub const SEND_TIMEOUT: Duration = Duration::from_secs(5);
/// Body returned by connector webhooks on success.
const EXPECTED_RESPONSE: &str = "1";

/// Posts cards to webhooks. Sends once; there are no retries.
pub struct TeamsClient {
    http: Client,
}

impl TeamsClient {
    pub fn new() -> Result<Self> {
        let http = Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { http })
    }

    pub async fn send(&self, webhook_url: &str, card: &MessageCard) -> Result<()> {
        debug!(title = %card.title, facts = card.facts().count(), "posting message card");

        // The webhook URL carries the credentials, keep it out of errors.
        let response = self
            .http
            .post(webhook_url)
            .json(card)
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Webhook request failed")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable>".to_string());

        if !status.is_success() {
            anyhow::bail!("webhook returned {status}: {body}");
        }
        if body.trim() != EXPECTED_RESPONSE {
            debug!(%body, "unexpected webhook response body");
        }

        Ok(())
    }
}
