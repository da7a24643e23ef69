//! Client for the parts of the YouTube Data API v3 and the YouTube Analytics API v2 that the
//! dashboard reads.
//!
//! Each submodule holds the serde types for one API resource, trimmed to the fields the
//! dashboard uses, plus conversions into the wire types of [`ytdash_sdk::protocol`]. Upstream
//! quirks (ids that are sometimes objects and sometimes strings, counters encoded as strings,
//! `items` omitted from empty responses) are absorbed here so nothing past this module sees them.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use youtube_dashboard::config::Config;
//! use youtube_dashboard::youtube_api::YouTubeClient;
//! use tokio_stream::StreamExt;
//!
//! # async fn example() -> eyre::Result<()> {
//! let config = Config::builder().api_key("AIza...").build()?;
//! let client = YouTubeClient::new(&config)?;
//!
//! let mut pages = std::pin::pin!(client.channel_videos("UC_x5XG1OV2P6uZZ5FSM9Ttw", 3));
//! while let Some(page) = pages.next().await {
//!     for video in page?.items {
//!         println!("{}: {}", video.id.video_id(), video.snippet.title);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod analytics;
pub mod channels;
pub mod client;
pub mod comments;
pub mod search;
pub mod types;
pub mod videos;

pub use client::YouTubeClient;
pub use search::{RawVideo, ResourceId, SearchOrder};
pub use types::{Page, PageInfo, PageStream};
