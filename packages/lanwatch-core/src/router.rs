//! Router HTTP session: Basic-auth login probe and client-list fetch.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;

/// Per-request timeout. Consumer routers can be slow to render status
/// pages, but a hung request must not stall the poll loop.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Path probed at login to confirm the credentials work.
const LOGIN_PROBE_PATH: &str = "/index.html";

/// Client-list endpoint. The common CGI path; varies by router model.
const CLIENT_LIST_PATH: &str = "/index.cgi/wireless_client_list";

/// Where raw client-list bodies come from. The monitor only ever sees
/// this seam, so tests can script responses without a router.
#[async_trait]
pub trait DeviceSource: Send {
    /// Authenticate the session. `Ok(false)` means the endpoint
    /// answered but rejected the credentials.
    async fn login(&mut self) -> Result<bool>;

    /// Fetch the raw client-list response body.
    async fn fetch_clients(&mut self) -> Result<String>;
}

/// HTTP session against a router's web interface using Basic auth.
///
/// This matches the most common consumer-router setup; models with
/// bespoke login flows need their own [`DeviceSource`] implementation.
#[derive(Debug, Clone)]
pub struct RouterClient {
    base_url: String,
    username: String,
    password: String,
    client: reqwest::Client,
}

impl RouterClient {
    pub fn new(host: &str, username: &str, password: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            base_url: format!("http://{host}"),
            username: username.to_string(),
            password: password.to_string(),
            client,
        })
    }
}

#[async_trait]
impl DeviceSource for RouterClient {
    async fn login(&mut self) -> Result<bool> {
        let url = format!("{}{}", self.base_url, LOGIN_PROBE_PATH);
        let resp = self
            .client
            .get(&url)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .with_context(|| format!("login request to {url} failed"))?;

        Ok(resp.status().is_success())
    }

    async fn fetch_clients(&mut self) -> Result<String> {
        let url = format!("{}{}", self.base_url, CLIENT_LIST_PATH);
        let resp = self
            .client
            .get(&url)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .with_context(|| format!("client list request to {url} failed"))?;

        // A refusal here is a degraded cycle, not an error: the next
        // poll may well succeed.
        if !resp.status().is_success() {
            tracing::warn!("client list request returned {}", resp.status());
            return Ok(String::new());
        }

        resp.text().await.context("failed to read client list body")
    }
}
