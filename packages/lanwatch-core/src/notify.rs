//! Join-event delivery.
//!
//! Actual transports live behind the [`Notifier`] trait; the monitor
//! neither knows nor cares where events end up. Delivery failures are
//! logged by the caller and never abort a poll cycle.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;

use crate::parser::DeviceRecord;

/// Per-delivery timeout. A slow webhook endpoint must not stall the
/// poll loop.
const DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a join notification for `device`.
    async fn notify(&self, device: &DeviceRecord) -> Result<()>;
}

/// Payload POSTed by [`WebhookNotifier`].
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JoinEvent<'a> {
    timestamp: String,
    device: &'a DeviceRecord,
}

/// POSTs join events as JSON to a configured endpoint.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    url: String,
    client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new(url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(DELIVERY_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            url: url.trim().to_string(),
            client,
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, device: &DeviceRecord) -> Result<()> {
        let payload = JoinEvent {
            timestamp: chrono::Utc::now().to_rfc3339(),
            device,
        };

        let resp = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .context("failed to deliver join event")?;

        if !resp.status().is_success() {
            anyhow::bail!("webhook returned {}", resp.status());
        }

        tracing::info!("notification sent for device {}", device.mac);
        Ok(())
    }
}

/// Fallback notifier that only records the join in the log. Used when
/// no webhook is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, device: &DeviceRecord) -> Result<()> {
        tracing::info!(
            "device joined: {} (ip: {}, hostname: {}, vendor: {})",
            device.mac,
            device.ip.as_deref().unwrap_or("-"),
            device.hostname.as_deref().unwrap_or("-"),
            device.vendor.as_deref().unwrap_or("-"),
        );
        Ok(())
    }
}
