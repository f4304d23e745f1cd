use anyhow::{Context, Result, bail};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::AssistantTransport;
use super::protocol::{ChatReply, ChatRequest};

const CHAT_PATH: &str = "api/chatbot";

/// HTTP client for the assistant's `/api/chatbot` endpoint.
pub struct AssistantClient {
    client: Client,
    url: Url,
    api_key: Option<String>,
}

impl AssistantClient {
    /// Creates a client for the assistant hosted at `endpoint`.
    ///
    /// `timeout` bounds each request end to end; expiry surfaces as an
    /// ordinary send failure.
    pub fn new(endpoint: &Url, timeout: Duration, api_key: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            url: chat_url(endpoint)?,
            api_key,
        })
    }
}

impl AssistantTransport for AssistantClient {
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply> {
        let mut http_request = self.client.post(self.url.clone()).json(request);

        if let Some(api_key) = &self.api_key {
            http_request = http_request.bearer_auth(api_key);
        }

        let response = http_request
            .send()
            .await
            .with_context(|| format!("Failed to connect to assistant endpoint: {}", self.url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(%status, %body, "assistant rejected request");
            bail!("Assistant request failed with status {status}");
        }

        let reply = response
            .json::<ChatReply>()
            .await
            .context("Failed to parse assistant reply")?;

        debug!(next_state = %reply.next_state, "assistant replied");
        Ok(reply)
    }
}

/// Joins the chat path onto the endpoint, keeping any base path it carries.
fn chat_url(endpoint: &Url) -> Result<Url> {
    let mut base = endpoint.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }

    base.join(CHAT_PATH)
        .with_context(|| format!("Invalid assistant endpoint: {endpoint}"))
}
