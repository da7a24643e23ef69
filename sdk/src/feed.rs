//! Infinite-scroll state machine for a channel's video list.
//!
//! [`VideoFeed`] owns everything a dashboard view needs to page through a channel's videos:
//! the accumulated list, the most recent page cursor, and the in-flight marker that keeps at
//! most one page request outstanding. It performs no I/O itself. Each transition hands back
//! a [`FetchRequest`] describing the page to load, and the caller reports the outcome via
//! [`VideoFeed::complete`]. The async wiring lives in [`crate::driver`].
//!
//! ```text
//! Idle ──select_channel──▶ Loading ──ok──▶ Ready ◀──ok/err──▶ LoadingMore
//!                                                  (has_more = false once the cursor is null)
//! ```

use crate::protocol::{EnrichedVideo, VideoPage};

/// Where the feed currently is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No channel selected yet.
    Idle,
    /// Waiting for the first page of the selected channel.
    Loading,
    /// Not fetching. More pages may or may not exist (see [`VideoFeed::has_more`]).
    Ready,
    /// Waiting for a subsequent page.
    LoadingMore,
}

/// Which kind of page a [`FetchRequest`] asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    /// First page of a channel; replaces the list.
    Initial,
    /// Next page; appended to the list.
    More,
}

/// A page load the caller must perform and later report back through [`VideoFeed::complete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub channel_id: String,
    /// Cursor echoed back exactly as the server issued it. `None` for initial loads.
    pub page_token: Option<String>,
    pub kind: FetchKind,
    generation: u64,
}

/// What to do when loading a subsequent page keeps failing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Keep the feed retryable: the next sentinel evaluation tries the same cursor again.
    #[default]
    Unlimited,
    /// Give up on further pages after this many consecutive load-more failures.
    StopAfter(u32),
}

/// What a view should render for the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedView {
    /// No channel selected.
    Idle,
    /// Initial page is loading.
    Loading,
    /// Nothing to show (no videos, or the initial load failed).
    Empty,
    /// Some videos are shown and more pages exist.
    Partial { loading_more: bool },
    /// Every video of the channel has been loaded.
    Complete,
}

/// Infinite-scroll state for one dashboard session.
#[derive(Debug, Clone)]
pub struct VideoFeed {
    channel_id: Option<String>,
    videos: Vec<EnrichedVideo>,
    next_page_token: Option<String>,
    has_more: bool,
    phase: Phase,
    /// Generation of the outstanding fetch, if any.
    in_flight: Option<u64>,
    /// Bumped on every channel change; fetches from older generations are stale.
    generation: u64,
    /// A channel change happened while a fetch was in flight.
    deferred_initial: bool,
    retry_policy: RetryPolicy,
    consecutive_failures: u32,
}

impl Default for VideoFeed {
    fn default() -> Self {
        Self::new(RetryPolicy::default())
    }
}

impl VideoFeed {
    pub fn new(retry_policy: RetryPolicy) -> Self {
        Self {
            channel_id: None,
            videos: Vec::new(),
            next_page_token: None,
            has_more: true,
            phase: Phase::Idle,
            in_flight: None,
            generation: 0,
            deferred_initial: false,
            retry_policy,
            consecutive_failures: 0,
        }
    }

    pub fn channel_id(&self) -> Option<&str> {
        self.channel_id.as_deref()
    }

    pub fn videos(&self) -> &[EnrichedVideo] {
        &self.videos
    }

    pub fn next_page_token(&self) -> Option<&str> {
        self.next_page_token.as_deref()
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// True while any page request is outstanding, including one for a previous channel.
    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn view(&self) -> FeedView {
        match self.phase {
            Phase::Idle => FeedView::Idle,
            Phase::Loading => FeedView::Loading,
            Phase::LoadingMore => FeedView::Partial { loading_more: true },
            Phase::Ready if self.videos.is_empty() => FeedView::Empty,
            Phase::Ready if self.has_more => FeedView::Partial {
                loading_more: false,
            },
            Phase::Ready => FeedView::Complete,
        }
    }

    /// Switches the feed to `channel_id`, discarding everything loaded so far.
    ///
    /// Returns the initial page request, unless a fetch is still outstanding. In that case the
    /// initial request is handed out by [`Self::complete`] once the outstanding one settles.
    pub fn select_channel(&mut self, channel_id: impl Into<String>) -> Option<FetchRequest> {
        let channel_id = channel_id.into();
        tracing::debug!(channel_id = %channel_id, "selecting channel");

        self.generation += 1;
        self.channel_id = Some(channel_id);
        self.videos.clear();
        self.next_page_token = None;
        self.has_more = true;
        self.consecutive_failures = 0;
        self.phase = Phase::Loading;

        if self.in_flight.is_some() {
            tracing::debug!("fetch for previous channel still in flight, deferring initial load");
            self.deferred_initial = true;
            return None;
        }
        self.start(FetchKind::Initial)
    }

    /// Evaluates the load-more trigger while the scroll sentinel is visible.
    ///
    /// Returns a request only if no fetch is in flight and a next-page cursor exists. Callers
    /// should invoke this again after every completed fetch for as long as the sentinel stays
    /// visible.
    pub fn sentinel_visible(&mut self) -> Option<FetchRequest> {
        if self.phase != Phase::Ready
            || self.in_flight.is_some()
            || !self.has_more
            || self.next_page_token.is_none()
        {
            return None;
        }
        self.start(FetchKind::More)
    }

    /// Records the outcome of `request`.
    ///
    /// Returns a follow-up request when a channel change was deferred behind `request`.
    pub fn complete(
        &mut self,
        request: FetchRequest,
        result: eyre::Result<VideoPage>,
    ) -> Option<FetchRequest> {
        if self.in_flight != Some(request.generation) {
            tracing::warn!(
                channel_id = %request.channel_id,
                "ignoring completion of a fetch that is not in flight"
            );
            return None;
        }
        self.in_flight = None;

        if request.generation != self.generation {
            tracing::debug!(
                channel_id = %request.channel_id,
                "discarding page for previously selected channel"
            );
            if std::mem::take(&mut self.deferred_initial) {
                return self.start(FetchKind::Initial);
            }
            return None;
        }

        match (request.kind, result) {
            (FetchKind::Initial, Ok(page)) => {
                tracing::debug!(
                    channel_id = %request.channel_id,
                    videos = page.videos.len(),
                    has_more = page.next_page_token.is_some(),
                    "loaded first page"
                );
                self.videos = page.videos;
                self.accept_cursor(page.next_page_token);
            }
            (FetchKind::More, Ok(page)) => {
                tracing::debug!(
                    channel_id = %request.channel_id,
                    videos = page.videos.len(),
                    has_more = page.next_page_token.is_some(),
                    "loaded next page"
                );
                self.videos.extend(page.videos);
                self.accept_cursor(page.next_page_token);
            }
            (FetchKind::Initial, Err(e)) => {
                tracing::error!(
                    channel_id = %request.channel_id,
                    error = %e,
                    "failed to load videos"
                );
                // without a cursor the sentinel cannot fire until the channel changes
                self.videos.clear();
                self.next_page_token = None;
            }
            (FetchKind::More, Err(e)) => {
                self.consecutive_failures += 1;
                tracing::warn!(
                    channel_id = %request.channel_id,
                    failures = self.consecutive_failures,
                    error = %e,
                    "failed to load more videos"
                );
                if let RetryPolicy::StopAfter(limit) = self.retry_policy {
                    if self.consecutive_failures >= limit {
                        tracing::warn!(
                            channel_id = %request.channel_id,
                            "giving up on loading more videos"
                        );
                        self.has_more = false;
                    }
                }
            }
        }
        self.phase = Phase::Ready;
        None
    }

    fn accept_cursor(&mut self, next_page_token: Option<String>) {
        self.has_more = next_page_token.is_some();
        self.next_page_token = next_page_token;
        self.consecutive_failures = 0;
    }

    fn start(&mut self, kind: FetchKind) -> Option<FetchRequest> {
        let channel_id = self.channel_id.clone()?;
        let page_token = match kind {
            FetchKind::Initial => None,
            FetchKind::More => self.next_page_token.clone(),
        };
        self.in_flight = Some(self.generation);
        self.phase = match kind {
            FetchKind::Initial => Phase::Loading,
            FetchKind::More => Phase::LoadingMore,
        };
        Some(FetchRequest {
            channel_id,
            page_token,
            kind,
            generation: self.generation,
        })
    }
}
