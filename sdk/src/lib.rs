//! Client-side building blocks for the YouTube channel dashboard.
//!
//! - [`protocol`]: JSON types exchanged with the dashboard server.
//! - [`feed`]: the infinite-scroll state machine for a channel's video list.
//! - [`driver`]: a tokio task that runs a [`feed::VideoFeed`] against a [`driver::PageSource`].
//! - [`http`]: a [`driver::PageSource`] that talks to the server over HTTP (feature `http`).
//! - [`selection`]: the persisted "current channel" selection.
//! - [`format`]: compact counters and durations for display.
//!
//! ```rust,no_run
//! use ytdash_sdk::driver::spawn_feed;
//! use ytdash_sdk::feed::RetryPolicy;
//! use ytdash_sdk::http::HttpPageSource;
//!
//! # async fn example() -> eyre::Result<()> {
//! let source = HttpPageSource::new("http://127.0.0.1:3000")?;
//! let (feed, _task) = spawn_feed(source, RetryPolicy::Unlimited);
//! feed.select_channel("UC_x5XG1OV2P6uZZ5FSM9Ttw").await?;
//! // whenever the bottom of the list scrolls into view:
//! feed.set_sentinel_visible(true).await?;
//! # Ok(())
//! # }
//! ```

pub mod driver;
pub mod feed;
pub mod format;
#[cfg(feature = "http")]
pub mod http;
pub mod protocol;
pub mod selection;

pub use driver::{FeedEvent, FeedHandle, FeedSnapshot, PageSource, spawn_feed};
pub use feed::{FeedView, FetchKind, FetchRequest, Phase, RetryPolicy, VideoFeed};
pub use protocol::{Comment, EnrichedVideo, ErrorBody, VideoPage, VideoStatistics};
