//! The YouTube Data and Analytics API client.

use crate::config::{ApiKey, Config};
use crate::youtube_api::{
    analytics::{CountryViewsReport, DailyViewsReport, Report, RetentionReport},
    channels::{Channel, ChannelListResponse},
    comments::CommentThreadListResponse,
    search::{RawVideo, SearchListResponse, SearchOrder},
    types::{Page, PageStream},
    videos::VideoListResponse,
};
use eyre::Context;
use jiff::civil::Date;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio_stream::Stream;
use tracing::instrument;
use ytdash_sdk::protocol::{Comment, CountryViews, DailyViews, VideoRetention, VideoStatistics};

/// How a request proves it may call the API.
#[derive(Clone, Copy)]
pub(crate) enum Credential<'a> {
    /// The server's own API key, for public Data API resources.
    ApiKey,
    /// A caller's OAuth access token, for the channel owner's Analytics reports.
    Bearer(&'a str),
}

/// Client for the YouTube Data API v3 and the YouTube Analytics API v2.
///
/// Public data (search, statistics, comments, channels) is read with the server's API key.
/// Analytics reports belong to the channel owner, so those methods take the caller's access
/// token instead and pass it through unchanged.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct YouTubeClient {
    api_key: ApiKey,
    data_api_base: Arc<str>,
    analytics_api_base: Arc<str>,
    page_size: u32,
    comments_per_video: u32,
    /// HTTP client for API requests
    client: reqwest::Client,
}

impl YouTubeClient {
    /// Creates a client with its own connection pool, configured with the request timeout.
    pub fn new(config: &Config) -> eyre::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .context("build HTTP client")?;
        Ok(Self::with_client(config, client))
    }

    /// Creates a client that shares an existing HTTP client.
    pub fn with_client(config: &Config, client: reqwest::Client) -> Self {
        Self {
            api_key: config.api_key.clone(),
            data_api_base: Arc::from(config.data_api_base.as_str()),
            analytics_api_base: Arc::from(config.analytics_api_base.as_str()),
            page_size: config.page_size,
            comments_per_video: config.comments_per_video,
            client,
        }
    }

    /// Sends a GET request to the API, with shared error handling.
    ///
    /// The API key travels as the `key` query parameter; a bearer token as the `Authorization`
    /// header. Any non-2xx status is turned into an error carrying upstream's error text.
    ///
    /// Returns the raw [`reqwest::Response`] for method-specific JSON parsing.
    #[instrument(skip(self, credential), level = tracing::Level::TRACE)]
    pub(crate) async fn make_request(
        &self,
        url: &str,
        query_params: &[(&str, &str)],
        credential: Credential<'_>,
    ) -> eyre::Result<reqwest::Response> {
        let mut request = self.client.get(url).query(query_params);
        request = match credential {
            Credential::ApiKey => request.query(&[("key", self.api_key.expose())]),
            Credential::Bearer(token) => request.bearer_auth(token),
        };

        let response = request
            .send()
            .await
            // the URL carries the API key
            .map_err(reqwest::Error::without_url)
            .with_context(|| format!("send request to YouTube API: {url}"))?;

        let status_code = response.status();
        if !status_code.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            eyre::bail!("YouTube API request to {url} failed with status {status_code}: {error_text}");
        }

        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query_params: &[(&str, &str)],
        credential: Credential<'_>,
    ) -> eyre::Result<T> {
        self.make_request(url, query_params, credential)
            .await?
            .json()
            .await
            .map_err(reqwest::Error::without_url)
            .with_context(|| format!("parse YouTube API response from {url} as JSON"))
    }

    /// Searches a channel's videos.
    ///
    /// Uses `search.list` restricted to `type=video`.
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/search/list>
    #[instrument(skip(self))]
    pub async fn search_channel_videos(
        &self,
        channel_id: &str,
        order: SearchOrder,
        max_results: u32,
        page_token: Option<&str>,
    ) -> eyre::Result<SearchListResponse> {
        let url = format!("{}/search", self.data_api_base);
        let max_results = max_results.to_string();
        let mut query_params = vec![
            ("part", "snippet,id"),
            ("channelId", channel_id),
            ("order", order.as_query_value()),
            ("maxResults", max_results.as_str()),
            ("type", "video"),
        ];
        if let Some(token) = page_token {
            query_params.push(("pageToken", token));
        }

        let response: SearchListResponse = self
            .get_json(&url, &query_params, Credential::ApiKey)
            .await
            .context("search channel videos")?;
        tracing::debug!(
            items = response.items.len(),
            total = response.page_info.total_results,
            "searched channel videos"
        );
        Ok(response)
    }

    /// One page of a channel's videos, newest first, using the configured page size.
    pub async fn channel_videos_page(
        &self,
        channel_id: &str,
        page_token: Option<&str>,
    ) -> eyre::Result<Page<RawVideo>> {
        let (items, next_page_token) = self
            .search_channel_videos(channel_id, SearchOrder::Date, self.page_size, page_token)
            .await?
            .into_videos();
        Ok(Page {
            items,
            next_page_token,
        })
    }

    /// Returns a stream of up to `max_pages` pages of a channel's videos, newest first.
    ///
    /// Each page is requested only once the previous one has been consumed.
    pub fn channel_videos<'a>(
        &'a self,
        channel_id: &'a str,
        max_pages: usize,
    ) -> impl Stream<Item = eyre::Result<Page<RawVideo>>> + use<'a> {
        PageStream::new(
            move |page_token: Option<String>| async move {
                self.channel_videos_page(channel_id, page_token.as_deref())
                    .await
            },
            max_pages,
        )
    }

    /// The single most viewed video of a channel, if it has any.
    #[instrument(skip(self))]
    pub async fn most_viewed_video(&self, channel_id: &str) -> eyre::Result<Option<RawVideo>> {
        let (videos, _) = self
            .search_channel_videos(channel_id, SearchOrder::ViewCount, 1, None)
            .await?
            .into_videos();
        Ok(videos.into_iter().next())
    }

    /// Fetches statistics for up to 50 videos in one request.
    ///
    /// Ids upstream doesn't know are missing from the result.
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/videos/list>
    #[instrument(skip(self, ids), fields(ids = ids.len()))]
    pub async fn video_statistics(
        &self,
        ids: &[String],
    ) -> eyre::Result<Vec<(String, VideoStatistics)>> {
        let url = format!("{}/videos", self.data_api_base);
        let joined = ids.join(",");
        let query_params = [("part", "statistics"), ("id", joined.as_str())];

        let response: VideoListResponse = self
            .get_json(&url, &query_params, Credential::ApiKey)
            .await
            .context("fetch video statistics")?;
        Ok(response.into_statistics())
    }

    /// Fetches the latest top-level comments of a video.
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/commentThreads/list>
    #[instrument(skip(self))]
    pub async fn latest_comments(&self, video_id: &str) -> eyre::Result<Vec<Comment>> {
        let url = format!("{}/commentThreads", self.data_api_base);
        let max_results = self.comments_per_video.to_string();
        let query_params = [
            ("part", "snippet"),
            ("videoId", video_id),
            ("maxResults", max_results.as_str()),
        ];

        let response: CommentThreadListResponse = self
            .get_json(&url, &query_params, Credential::ApiKey)
            .await
            .context("fetch comment threads")?;
        Ok(response.into_comments())
    }

    /// Looks up a channel by id.
    ///
    /// Returns `Ok(None)` if there is no such channel.
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/channels/list>
    #[instrument(skip(self))]
    pub async fn get_channel(&self, channel_id: &str) -> eyre::Result<Option<Channel>> {
        let url = format!("{}/channels", self.data_api_base);
        let query_params = [("part", "snippet,statistics"), ("id", channel_id)];

        let response: ChannelListResponse = self
            .get_json(&url, &query_params, Credential::ApiKey)
            .await
            .context("fetch channel")?;
        Ok(response.items.into_iter().next())
    }

    async fn analytics_report<R: DeserializeOwned>(
        &self,
        access_token: &str,
        query_params: &[(&str, &str)],
    ) -> eyre::Result<Report<R>> {
        let url = format!("{}/reports", self.analytics_api_base);
        let mut params = vec![("ids", "channel==MINE")];
        params.extend_from_slice(query_params);
        self.get_json(&url, &params, Credential::Bearer(access_token))
            .await
    }

    /// Views of the authorized channel per day, oldest first.
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/analytics/reference/reports/query>
    #[instrument(skip(self, access_token))]
    pub async fn daily_views(
        &self,
        access_token: &str,
        start: Date,
        end: Date,
    ) -> eyre::Result<Vec<DailyViews>> {
        let (start, end) = (start.to_string(), end.to_string());
        let report: DailyViewsReport = self
            .analytics_report(
                access_token,
                &[
                    ("startDate", start.as_str()),
                    ("endDate", end.as_str()),
                    ("metrics", "views"),
                    ("dimensions", "day"),
                    ("sort", "day"),
                ],
            )
            .await
            .context("fetch daily views report")?;
        Ok(report.into_daily_views())
    }

    /// Views of the authorized channel per country, most views first, at most 200 countries.
    #[instrument(skip(self, access_token))]
    pub async fn country_views(
        &self,
        access_token: &str,
        start: Date,
        end: Date,
    ) -> eyre::Result<Vec<CountryViews>> {
        let (start, end) = (start.to_string(), end.to_string());
        let report: CountryViewsReport = self
            .analytics_report(
                access_token,
                &[
                    ("startDate", start.as_str()),
                    ("endDate", end.as_str()),
                    ("metrics", "views"),
                    ("dimensions", "country"),
                    ("sort", "-views"),
                    ("maxResults", "200"),
                ],
            )
            .await
            .context("fetch country views report")?;
        Ok(report.into_country_views())
    }

    /// Average view duration and percentage watched for one of the authorized channel's videos.
    #[instrument(skip(self, access_token))]
    pub async fn video_retention(
        &self,
        access_token: &str,
        video_id: &str,
        start: Date,
        end: Date,
    ) -> eyre::Result<VideoRetention> {
        let (start, end) = (start.to_string(), end.to_string());
        let filter = format!("video=={video_id}");
        let report: RetentionReport = self
            .analytics_report(
                access_token,
                &[
                    ("startDate", start.as_str()),
                    ("endDate", end.as_str()),
                    ("metrics", "averageViewDuration,averageViewPercentage"),
                    ("filters", filter.as_str()),
                ],
            )
            .await
            .context("fetch video retention report")?;
        Ok(report.into_retention())
    }
}
