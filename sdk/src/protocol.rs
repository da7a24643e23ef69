//! Wire types exchanged between the dashboard server and its clients.
//!
//! Everything here is serialized as camelCase JSON, matching the shapes the YouTube Data API
//! itself uses so that snippets can be passed through from upstream without re-mapping.

use jiff::Timestamp;
use jiff::civil::Date;
use serde::{Deserialize, Serialize};

/// One page of enriched videos, as returned by `GET /api/videos`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoPage {
    /// Videos in the order upstream returned them.
    pub videos: Vec<EnrichedVideo>,
    /// Opaque cursor for the next page.
    ///
    /// `None` (serialized as `null`) means there are no further pages.
    pub next_page_token: Option<String>,
}

/// A video joined with its statistics and latest comments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedVideo {
    /// The bare YouTube video id.
    pub id: String,
    pub snippet: VideoSnippet,
    /// `None` if upstream did not return statistics for this video.
    pub statistics: Option<VideoStatistics>,
    /// Latest top-level comments; empty if there are none or they could not be fetched.
    pub comments: Vec<Comment>,
}

impl EnrichedVideo {
    /// The public watch page for this video.
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.id)
    }

    /// The title to show for this video, with a placeholder for untitled uploads.
    pub fn display_title(&self) -> &str {
        if self.snippet.title.is_empty() {
            "Untitled Video"
        } else {
            &self.snippet.title
        }
    }
}

/// Basic details about a video.
///
/// See: <https://developers.google.com/youtube/v3/docs/search#snippet>
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSnippet {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// When the video was published.
    #[serde(default)]
    pub published_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_title: Option<String>,
    #[serde(default)]
    pub thumbnails: Thumbnails,
}

/// The thumbnail sizes the dashboard makes use of.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Thumbnails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Thumbnail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium: Option<Thumbnail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<Thumbnail>,
}

impl Thumbnails {
    /// The largest available thumbnail.
    pub fn best(&self) -> Option<&Thumbnail> {
        self.high
            .as_ref()
            .or(self.medium.as_ref())
            .or(self.default.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

/// Engagement counters for a video.
///
/// A counter is `None` when upstream hides it (e.g. likes disabled by the owner).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoStatistics {
    pub view_count: Option<u64>,
    pub like_count: Option<u64>,
    pub comment_count: Option<u64>,
}

/// A top-level comment on a video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// The comment thread id.
    pub id: String,
    pub author_name: String,
    pub published_at: Timestamp,
    /// The original (unformatted) comment text.
    pub text: String,
    pub author_avatar_url: Option<String>,
}

/// Body of every non-2xx response from the dashboard server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// Public summary of a channel, as returned by `GET /api/channel`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSummary {
    pub id: String,
    pub title: String,
    pub description: String,
    /// The channel's handle (e.g. `@example`), or empty if it has none.
    pub custom_url: String,
    pub thumbnails: Thumbnails,
    pub subscriber_count: Option<u64>,
    pub video_count: Option<u64>,
    pub view_count: Option<u64>,
}

/// Views on a single day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyViews {
    pub date: Date,
    pub views: u64,
}

/// Views from a single country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryViews {
    /// ISO 3166-1 alpha-2 country code.
    pub id: String,
    /// Number of views.
    pub value: u64,
}

/// Audience retention for a single video.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRetention {
    /// Average watch time, in seconds.
    pub average_view_duration: f64,
    /// Average fraction of the video watched, between 0 and 1.
    pub click_ratio: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_json_snapshot;
    use pretty_assertions::assert_eq;

    fn sample_video() -> EnrichedVideo {
        EnrichedVideo {
            id: "dQw4w9WgXcQ".to_string(),
            snippet: VideoSnippet {
                title: "Never Gonna Give You Up".to_string(),
                published_at: Some("2009-10-25T06:57:33Z".parse().unwrap()),
                thumbnails: Thumbnails {
                    high: Some(Thumbnail {
                        url: "https://i.ytimg.com/vi/dQw4w9WgXcQ/hqdefault.jpg".to_string(),
                        width: Some(480),
                        height: Some(360),
                    }),
                    ..Thumbnails::default()
                },
                ..VideoSnippet::default()
            },
            statistics: Some(VideoStatistics {
                view_count: Some(1_500_000_000),
                like_count: None,
                comment_count: Some(2_300_000),
            }),
            comments: vec![Comment {
                id: "Ugx1".to_string(),
                author_name: "@someone".to_string(),
                published_at: "2024-02-01T12:00:00Z".parse().unwrap(),
                text: "still a banger".to_string(),
                author_avatar_url: None,
            }],
        }
    }

    #[test]
    fn serialize_video_page() {
        let page = VideoPage {
            videos: vec![sample_video()],
            next_page_token: None,
        };

        assert_json_snapshot!(page, @r#"
        {
          "videos": [
            {
              "id": "dQw4w9WgXcQ",
              "snippet": {
                "title": "Never Gonna Give You Up",
                "publishedAt": "2009-10-25T06:57:33Z",
                "thumbnails": {
                  "high": {
                    "url": "https://i.ytimg.com/vi/dQw4w9WgXcQ/hqdefault.jpg",
                    "width": 480,
                    "height": 360
                  }
                }
              },
              "statistics": {
                "viewCount": 1500000000,
                "likeCount": null,
                "commentCount": 2300000
              },
              "comments": [
                {
                  "id": "Ugx1",
                  "authorName": "@someone",
                  "publishedAt": "2024-02-01T12:00:00Z",
                  "text": "still a banger",
                  "authorAvatarUrl": null
                }
              ]
            }
          ],
          "nextPageToken": null
        }
        "#);
    }

    #[test]
    fn missing_next_page_token_means_last_page() {
        let page: VideoPage = serde_json::from_str(r#"{"videos": []}"#).unwrap();
        assert_eq!(page.next_page_token, None);

        let page: VideoPage =
            serde_json::from_str(r#"{"videos": [], "nextPageToken": "CAwQAA"}"#).unwrap();
        assert_eq!(page.next_page_token.as_deref(), Some("CAwQAA"));
    }

    #[test]
    fn best_thumbnail_prefers_largest() {
        let mut thumbnails = Thumbnails {
            default: Some(Thumbnail {
                url: "d".to_string(),
                width: None,
                height: None,
            }),
            medium: Some(Thumbnail {
                url: "m".to_string(),
                width: None,
                height: None,
            }),
            high: None,
        };
        assert_eq!(thumbnails.best().map(|t| t.url.as_str()), Some("m"));
        thumbnails.medium = None;
        assert_eq!(thumbnails.best().map(|t| t.url.as_str()), Some("d"));
        thumbnails.default = None;
        assert_eq!(thumbnails.best(), None);
    }

    #[test]
    fn untitled_videos_get_placeholder() {
        let mut video = sample_video();
        assert_eq!(video.display_title(), "Never Gonna Give You Up");
        video.snippet.title.clear();
        assert_eq!(video.display_title(), "Untitled Video");
        assert_eq!(video.watch_url(), "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
    }
}
