//! What each API route computes, independent of HTTP.

use crate::config::Config;
use crate::enrich::Enricher;
use crate::youtube_api::YouTubeClient;
use eyre::Context;
use jiff::ToSpan;
use jiff::civil::{self, Date};
use jiff::tz::TimeZone;
use tracing::instrument;
use ytdash_sdk::protocol::{ChannelSummary, CountryViews, DailyViews, VideoPage, VideoRetention};

/// First day of the retention report window.
const RETENTION_START: Date = civil::date(2020, 1, 1);

#[derive(Debug, Clone)]
pub struct Dashboard {
    youtube: YouTubeClient,
    enricher: Enricher<YouTubeClient>,
}

impl Dashboard {
    pub fn new(config: &Config) -> eyre::Result<Self> {
        let youtube = YouTubeClient::new(config).context("create YouTube client")?;
        Ok(Self::with_client(youtube, config.statistics_chunk_size))
    }

    pub fn with_client(youtube: YouTubeClient, statistics_chunk_size: usize) -> Self {
        Self {
            enricher: Enricher::new(youtube.clone(), statistics_chunk_size),
            youtube,
        }
    }

    /// One page of a channel's videos, newest first, enriched with statistics and comments.
    #[instrument(skip(self))]
    pub async fn videos_page(
        &self,
        channel_id: &str,
        page_token: Option<&str>,
    ) -> eyre::Result<VideoPage> {
        let page = self
            .youtube
            .channel_videos_page(channel_id, page_token)
            .await
            .context("list channel videos")?;
        let videos = self
            .enricher
            .enrich(page.items)
            .await
            .context("enrich channel videos")?;
        tracing::debug!(
            videos = videos.len(),
            has_more = page.next_page_token.is_some(),
            "built video page"
        );
        Ok(VideoPage {
            videos,
            next_page_token: page.next_page_token,
        })
    }

    /// The channel's most viewed video as a single-item page.
    #[instrument(skip(self))]
    pub async fn most_popular(&self, channel_id: &str) -> eyre::Result<VideoPage> {
        let video = self
            .youtube
            .most_viewed_video(channel_id)
            .await
            .context("find most viewed video")?;
        let videos = self
            .enricher
            .enrich(video.into_iter().collect())
            .await
            .context("enrich most viewed video")?;
        Ok(VideoPage {
            videos,
            next_page_token: None,
        })
    }

    /// `None` if there is no channel with this id.
    #[instrument(skip(self))]
    pub async fn channel_summary(&self, channel_id: &str) -> eyre::Result<Option<ChannelSummary>> {
        let channel = self.youtube.get_channel(channel_id).await?;
        Ok(channel.map(ChannelSummary::from))
    }

    #[instrument(skip_all)]
    pub async fn daily_views(&self, access_token: &str) -> eyre::Result<Vec<DailyViews>> {
        let (start, end) = last_year()?;
        self.youtube.daily_views(access_token, start, end).await
    }

    #[instrument(skip_all)]
    pub async fn country_views(&self, access_token: &str) -> eyre::Result<Vec<CountryViews>> {
        let (start, end) = last_year()?;
        self.youtube.country_views(access_token, start, end).await
    }

    #[instrument(skip(self, access_token))]
    pub async fn video_retention(
        &self,
        access_token: &str,
        video_id: &str,
    ) -> eyre::Result<VideoRetention> {
        self.youtube
            .video_retention(access_token, video_id, RETENTION_START, today())
            .await
    }
}

/// Today, in UTC, which is what the Analytics API reports in.
fn today() -> Date {
    jiff::Timestamp::now().to_zoned(TimeZone::UTC).date()
}

fn last_year() -> eyre::Result<(Date, Date)> {
    let end = today();
    let start = end.checked_sub(1.year()).context("compute start of last year")?;
    Ok((start, end))
}
