//! Background task that drives a [`VideoFeed`] against a [`PageSource`].
//!
//! The task is the single owner of the feed. User interface events (channel selection, the
//! scroll sentinel entering or leaving the viewport) arrive over an mpsc channel, page
//! futures are polled one at a time, and every state change is published as a
//! [`FeedSnapshot`] on a watch channel.

use crate::feed::{FeedView, FetchRequest, Phase, RetryPolicy, VideoFeed};
use crate::protocol::{EnrichedVideo, VideoPage};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Somewhere pages of enriched videos can be loaded from.
pub trait PageSource: Send + Sync + 'static {
    /// Loads one page of `channel_id`'s videos.
    ///
    /// `page_token` is `None` for the first page, and otherwise exactly the cursor returned
    /// with the previous page.
    fn fetch_page(
        &self,
        channel_id: &str,
        page_token: Option<&str>,
    ) -> impl Future<Output = eyre::Result<VideoPage>> + Send;
}

/// Input to the feed task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedEvent {
    /// The user picked a different channel.
    SelectChannel(String),
    /// The scroll sentinel became visible (`true`) or hidden (`false`).
    SentinelVisible(bool),
}

/// Read-only view of the feed, published after every event and every completed fetch.
#[derive(Debug, Clone)]
pub struct FeedSnapshot {
    pub channel_id: Option<String>,
    pub videos: Vec<EnrichedVideo>,
    pub has_more: bool,
    pub phase: Phase,
    pub view: FeedView,
    pub sentinel_visible: bool,
}

impl FeedSnapshot {
    fn capture(feed: &VideoFeed, sentinel_visible: bool) -> Self {
        Self {
            channel_id: feed.channel_id().map(String::from),
            videos: feed.videos().to_vec(),
            has_more: feed.has_more(),
            phase: feed.phase(),
            view: feed.view(),
            sentinel_visible,
        }
    }
}

/// Handle to a running feed task.
///
/// The task stops once every handle has been dropped.
#[derive(Debug, Clone)]
pub struct FeedHandle {
    events: mpsc::Sender<FeedEvent>,
    snapshots: watch::Receiver<FeedSnapshot>,
}

impl FeedHandle {
    pub async fn select_channel(&self, channel_id: impl Into<String>) -> eyre::Result<()> {
        self.send(FeedEvent::SelectChannel(channel_id.into())).await
    }

    pub async fn set_sentinel_visible(&self, visible: bool) -> eyre::Result<()> {
        self.send(FeedEvent::SentinelVisible(visible)).await
    }

    pub async fn send(&self, event: FeedEvent) -> eyre::Result<()> {
        self.events
            .send(event)
            .await
            .map_err(|_| eyre::eyre!("feed task has stopped"))
    }

    /// The most recently published snapshot.
    pub fn snapshot(&self) -> FeedSnapshot {
        self.snapshots.borrow().clone()
    }

    /// A receiver that is notified on every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<FeedSnapshot> {
        self.snapshots.clone()
    }
}

type PageFuture = Pin<Box<dyn Future<Output = (FetchRequest, eyre::Result<VideoPage>)> + Send>>;

/// Spawns the feed task onto the current tokio runtime.
pub fn spawn_feed<S>(source: S, retry_policy: RetryPolicy) -> (FeedHandle, JoinHandle<()>)
where
    S: PageSource,
{
    let feed = VideoFeed::new(retry_policy);
    let (events_tx, events_rx) = mpsc::channel(16);
    let (snapshots_tx, snapshots_rx) = watch::channel(FeedSnapshot::capture(&feed, false));
    let task = tokio::spawn(run(Arc::new(source), feed, events_rx, snapshots_tx));
    (
        FeedHandle {
            events: events_tx,
            snapshots: snapshots_rx,
        },
        task,
    )
}

async fn run<S: PageSource>(
    source: Arc<S>,
    mut feed: VideoFeed,
    mut events: mpsc::Receiver<FeedEvent>,
    snapshots: watch::Sender<FeedSnapshot>,
) {
    let mut sentinel_visible = false;
    let mut in_flight: Option<PageFuture> = None;

    loop {
        tokio::select! {
            // Settle finished pages before looking at new input so that the page future is
            // always polled at least once per turn of the loop.
            biased;

            (request, result) = settle(&mut in_flight), if in_flight.is_some() => {
                in_flight = None;
                if let Some(request) = feed.complete(request, result) {
                    in_flight = Some(fetch(&source, request));
                }
            }
            event = events.recv() => {
                let Some(event) = event else {
                    tracing::debug!("all feed handles dropped, stopping feed task");
                    return;
                };
                match event {
                    FeedEvent::SelectChannel(channel_id) => {
                        if let Some(request) = feed.select_channel(channel_id) {
                            in_flight = Some(fetch(&source, request));
                        }
                    }
                    FeedEvent::SentinelVisible(visible) => {
                        tracing::trace!(visible, "sentinel visibility changed");
                        sentinel_visible = visible;
                    }
                }
            }
        }

        // The sentinel is level-triggered: as long as it stays visible, every time the feed
        // goes idle we check again whether another page should be loaded.
        if in_flight.is_none() && sentinel_visible {
            if let Some(request) = feed.sentinel_visible() {
                in_flight = Some(fetch(&source, request));
            }
        }

        snapshots.send_replace(FeedSnapshot::capture(&feed, sentinel_visible));
    }
}

fn fetch<S: PageSource>(source: &Arc<S>, request: FetchRequest) -> PageFuture {
    let source = Arc::clone(source);
    Box::pin(async move {
        tracing::debug!(
            channel_id = %request.channel_id,
            page_token = ?request.page_token,
            kind = ?request.kind,
            "fetching page"
        );
        let result = source
            .fetch_page(&request.channel_id, request.page_token.as_deref())
            .await;
        (request, result)
    })
}

async fn settle(in_flight: &mut Option<PageFuture>) -> (FetchRequest, eyre::Result<VideoPage>) {
    match in_flight {
        Some(page) => page.await,
        None => std::future::pending().await,
    }
}
