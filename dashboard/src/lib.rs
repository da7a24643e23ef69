//! Server side of the YouTube channel dashboard.
//!
//! The server proxies the YouTube Data and Analytics APIs: it lists a channel's videos a page
//! at a time and enriches each page with view/like/comment counts and the latest comments
//! ([`enrich`]), so that a client ([`ytdash_sdk`]) can render an infinitely scrolling list with
//! one request per page.

pub mod config;
pub mod enrich;
pub mod server;
pub mod service;
pub mod youtube_api;

pub use config::{Config, ServerArgs};
pub use server::Server;
pub use service::Dashboard;
