//! Server configuration.
//!
//! Built once at startup (from [`ServerArgs`] in the binary, or [`Config::builder`] in tests) and
//! shared read-only afterwards.

use derive_builder::Builder;
use eyre::Context;
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

pub const DEFAULT_DATA_API_BASE: &str = "https://www.googleapis.com/youtube/v3";
pub const DEFAULT_ANALYTICS_API_BASE: &str = "https://youtubeanalytics.googleapis.com/v2";

/// A YouTube Data API key.
///
/// Never printed; `Debug` shows a placeholder.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

impl From<String> for ApiKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl From<&str> for ApiKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

#[derive(Debug, Clone, Builder)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct Config {
    /// Key sent with every Data API request.
    #[builder(setter(into))]
    pub api_key: ApiKey,

    /// Address the HTTP server binds to.
    #[builder(default = "SocketAddr::from(([127, 0, 0, 1], 3000))")]
    pub listen: SocketAddr,

    /// Base URL of the YouTube Data API v3, without a trailing slash.
    #[builder(setter(into), default = "DEFAULT_DATA_API_BASE.to_string()")]
    pub data_api_base: String,

    /// Base URL of the YouTube Analytics API v2, without a trailing slash.
    #[builder(setter(into), default = "DEFAULT_ANALYTICS_API_BASE.to_string()")]
    pub analytics_api_base: String,

    /// Videos per page of `/api/videos`.
    #[builder(default = "12")]
    pub page_size: u32,

    /// Latest comments fetched for each video.
    #[builder(default = "3")]
    pub comments_per_video: u32,

    /// Maximum ids per statistics request.
    #[builder(default = "50")]
    pub statistics_chunk_size: usize,

    /// Timeout for each upstream request.
    #[builder(default = "Duration::from_secs(15)")]
    pub request_timeout: Duration,
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

impl ConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(key) = &self.api_key
            && key.expose().trim().is_empty()
        {
            return Err("api key must not be empty".to_string());
        }
        // search.list and videos.list both cap maxResults / id lists at 50
        if let Some(page_size) = self.page_size
            && !(1..=50).contains(&page_size)
        {
            return Err(format!("page size {page_size} is outside the allowed range [1, 50]"));
        }
        if let Some(chunk) = self.statistics_chunk_size
            && !(1..=50).contains(&chunk)
        {
            return Err(format!(
                "statistics chunk size {chunk} is outside the allowed range [1, 50]"
            ));
        }
        if let Some(comments) = self.comments_per_video
            && !(1..=100).contains(&comments)
        {
            return Err(format!(
                "comments per video {comments} is outside the allowed range [1, 100]"
            ));
        }
        Ok(())
    }
}

/// Command-line arguments of `ytdash-server`.
#[derive(Debug, clap::Parser)]
#[command(version, about = "JSON API for the YouTube channel dashboard")]
pub struct ServerArgs {
    /// YouTube Data API key
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Address to listen on
    #[arg(long, env = "YTDASH_LISTEN", default_value = "127.0.0.1:3000")]
    pub listen: SocketAddr,

    /// Base URL of the YouTube Data API
    #[arg(long, env = "YTDASH_DATA_API_BASE", default_value = DEFAULT_DATA_API_BASE)]
    pub data_api_base: String,

    /// Base URL of the YouTube Analytics API
    #[arg(long, env = "YTDASH_ANALYTICS_API_BASE", default_value = DEFAULT_ANALYTICS_API_BASE)]
    pub analytics_api_base: String,

    /// Videos per page
    #[arg(long, env = "YTDASH_PAGE_SIZE", default_value_t = 12)]
    pub page_size: u32,

    /// Latest comments to include per video
    #[arg(long, env = "YTDASH_COMMENTS_PER_VIDEO", default_value_t = 3)]
    pub comments_per_video: u32,

    /// Maximum video ids per statistics request
    #[arg(long, env = "YTDASH_STATISTICS_CHUNK_SIZE", default_value_t = 50)]
    pub statistics_chunk_size: usize,

    /// Upstream request timeout, in seconds
    #[arg(long, env = "YTDASH_REQUEST_TIMEOUT_SECS", default_value_t = 15)]
    pub request_timeout_secs: u64,
}

impl ServerArgs {
    pub fn into_config(self) -> eyre::Result<Config> {
        Config::builder()
            .api_key(self.api_key)
            .listen(self.listen)
            .data_api_base(self.data_api_base.trim_end_matches('/'))
            .analytics_api_base(self.analytics_api_base.trim_end_matches('/'))
            .page_size(self.page_size)
            .comments_per_video(self.comments_per_video)
            .statistics_chunk_size(self.statistics_chunk_size)
            .request_timeout(Duration::from_secs(self.request_timeout_secs))
            .build()
            .context("validate server configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults() {
        let config = Config::builder().api_key("k").build().unwrap();
        assert_eq!(config.listen, SocketAddr::from(([127, 0, 0, 1], 3000)));
        assert_eq!(config.data_api_base, DEFAULT_DATA_API_BASE);
        assert_eq!(config.analytics_api_base, DEFAULT_ANALYTICS_API_BASE);
        assert_eq!(config.page_size, 12);
        assert_eq!(config.comments_per_video, 3);
        assert_eq!(config.statistics_chunk_size, 50);
        assert_eq!(config.request_timeout, Duration::from_secs(15));
    }

    #[test]
    fn api_key_is_required() {
        assert!(Config::builder().build().is_err());
        assert!(Config::builder().api_key("  ").build().is_err());
    }

    #[test]
    fn limits_are_validated() {
        assert!(Config::builder().api_key("k").page_size(0).build().is_err());
        assert!(Config::builder().api_key("k").page_size(51).build().is_err());
        assert!(
            Config::builder()
                .api_key("k")
                .statistics_chunk_size(0)
                .build()
                .is_err()
        );
        assert!(
            Config::builder()
                .api_key("k")
                .statistics_chunk_size(51)
                .build()
                .is_err()
        );
        assert!(
            Config::builder()
                .api_key("k")
                .comments_per_video(0)
                .build()
                .is_err()
        );
    }

    #[test]
    fn api_key_is_redacted() {
        let config = Config::builder().api_key("secret-key").build().unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret-key"), "{debug}");
    }

    #[test]
    fn args_to_config() {
        let args = ServerArgs::try_parse_from([
            "ytdash-server",
            "--api-key",
            "k",
            "--listen",
            "0.0.0.0:8080",
            "--data-api-base",
            "http://127.0.0.1:9000/youtube/v3/",
            "--statistics-chunk-size",
            "20",
        ])
        .unwrap();
        let config = args.into_config().unwrap();
        assert_eq!(config.listen, SocketAddr::from(([0, 0, 0, 0], 8080)));
        assert_eq!(config.data_api_base, "http://127.0.0.1:9000/youtube/v3");
        assert_eq!(config.statistics_chunk_size, 20);
        assert_eq!(config.page_size, 12);
    }
}
