//! Joining search results with their statistics and latest comments.
//!
//! Statistics are required: if any statistics request fails, the whole page fails. Comments are
//! best effort: a video whose comments cannot be fetched (commonly because its owner disabled
//! them) is returned with none, and the failure is only logged.

use crate::youtube_api::{RawVideo, YouTubeClient};
use eyre::Context;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use tokio::task::JoinSet;
use tracing::instrument;
use ytdash_sdk::protocol::{Comment, EnrichedVideo, VideoStatistics};

/// Where statistics and comments come from.
pub trait VideoSource: Clone + Send + Sync + 'static {
    /// Statistics for each of `ids` that upstream knows about; `ids` never exceeds the chunk size.
    fn video_statistics(
        &self,
        ids: &[String],
    ) -> impl Future<Output = eyre::Result<Vec<(String, VideoStatistics)>>> + Send;

    /// The latest top-level comments of a video.
    fn latest_comments(
        &self,
        video_id: &str,
    ) -> impl Future<Output = eyre::Result<Vec<Comment>>> + Send;
}

impl VideoSource for YouTubeClient {
    fn video_statistics(
        &self,
        ids: &[String],
    ) -> impl Future<Output = eyre::Result<Vec<(String, VideoStatistics)>>> + Send {
        YouTubeClient::video_statistics(self, ids)
    }

    fn latest_comments(
        &self,
        video_id: &str,
    ) -> impl Future<Output = eyre::Result<Vec<Comment>>> + Send {
        YouTubeClient::latest_comments(self, video_id)
    }
}

#[derive(Debug, Clone)]
pub struct Enricher<S> {
    source: S,
    statistics_chunk_size: usize,
}

impl<S: VideoSource> Enricher<S> {
    pub fn new(source: S, statistics_chunk_size: usize) -> Self {
        Self {
            source,
            statistics_chunk_size: statistics_chunk_size.max(1),
        }
    }

    /// Turns search results into [`EnrichedVideo`]s, preserving their order.
    ///
    /// Statistics (in chunks) and comments (one request per video) are all fetched concurrently.
    /// An empty input makes no requests at all.
    #[instrument(skip_all, fields(videos = videos.len()))]
    pub async fn enrich(&self, videos: Vec<RawVideo>) -> eyre::Result<Vec<EnrichedVideo>> {
        if videos.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = videos
            .iter()
            .map(|video| video.id.video_id().to_string())
            .collect();

        let (statistics, mut comments) =
            tokio::join!(self.fetch_statistics(&ids), self.fetch_comments(&ids));
        let statistics = statistics?;

        let enriched = videos
            .into_iter()
            .zip(ids)
            .zip(comments.iter_mut())
            .map(|((video, id), comments)| EnrichedVideo {
                statistics: statistics.get(&id).copied(),
                comments: std::mem::take(comments),
                snippet: video.snippet,
                id,
            })
            .collect();
        Ok(enriched)
    }

    async fn fetch_statistics(
        &self,
        ids: &[String],
    ) -> eyre::Result<HashMap<String, VideoStatistics>> {
        let mut seen = HashSet::new();
        let unique: Vec<String> = ids
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .cloned()
            .collect();

        let mut requests = JoinSet::new();
        for chunk in unique.chunks(self.statistics_chunk_size) {
            let source = self.source.clone();
            let chunk = chunk.to_vec();
            requests.spawn(async move { source.video_statistics(&chunk).await });
        }
        tracing::trace!(requests = requests.len(), "fetching statistics");

        let mut by_id = HashMap::with_capacity(unique.len());
        while let Some(joined) = requests.join_next().await {
            // returning early drops the set, which aborts the remaining requests
            let statistics = joined.context("join statistics request")??;
            by_id.extend(statistics);
        }
        Ok(by_id)
    }

    async fn fetch_comments(&self, ids: &[String]) -> Vec<Vec<Comment>> {
        let mut requests = JoinSet::new();
        for (index, id) in ids.iter().enumerate() {
            let source = self.source.clone();
            let id = id.clone();
            requests.spawn(async move {
                let comments = source.latest_comments(&id).await;
                (index, id, comments)
            });
        }

        let mut comments = vec![Vec::new(); ids.len()];
        while let Some(joined) = requests.join_next().await {
            match joined {
                Ok((index, _, Ok(latest))) => comments[index] = latest,
                Ok((_, id, Err(e))) => {
                    tracing::warn!(video_id = %id, error = %e, "failed to fetch comments");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "comment request task failed");
                }
            }
        }
        comments
    }
}
