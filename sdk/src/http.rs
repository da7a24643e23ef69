//! [`PageSource`] backed by the dashboard server's `GET /api/videos` route.

use crate::driver::PageSource;
use crate::protocol::{ErrorBody, VideoPage};
use eyre::Context;
use std::time::Duration;

/// Loads pages of enriched videos from a running dashboard server.
#[derive(Debug, Clone)]
pub struct HttpPageSource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpPageSource {
    /// Creates a source for the server at `base_url` (e.g. `http://127.0.0.1:3000`).
    pub fn new(base_url: impl Into<String>) -> eyre::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("build HTTP client")?;
        Ok(Self::with_client(base_url, client))
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, client }
    }
}

impl PageSource for HttpPageSource {
    #[tracing::instrument(skip(self), level = tracing::Level::DEBUG)]
    async fn fetch_page(
        &self,
        channel_id: &str,
        page_token: Option<&str>,
    ) -> eyre::Result<VideoPage> {
        let url = format!("{}/api/videos", self.base_url);
        let mut query = vec![("channelId", channel_id)];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }

        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .with_context(|| format!("send request to {url}"))?;

        let status = response.status();
        if !status.is_success() {
            // Any non-2xx is a failed page; the body's message is only used for context.
            let message = match response.json::<ErrorBody>().await {
                Ok(body) => body.error,
                Err(_) => "no error message".to_string(),
            };
            eyre::bail!("dashboard server responded with {status}: {message}");
        }

        response
            .json()
            .await
            .context("parse video page from dashboard server")
    }
}
