//! YouTube Channels API types.

use crate::youtube_api::types::parse_count;
use serde::Deserialize;
use ytdash_sdk::protocol::{ChannelSummary, Thumbnails};

/// Response structure for the `channels.list` API call.
///
/// Looking up an id that does not exist yields a response without `items` rather than an error.
///
/// See: <https://developers.google.com/youtube/v3/docs/channels/list>
#[derive(Debug, Deserialize)]
pub struct ChannelListResponse {
    /// A list of channels that match the request criteria.
    #[serde(default)]
    pub items: Vec<Channel>,
}

/// A `channel` resource contains information about a YouTube channel.
///
/// See: <https://developers.google.com/youtube/v3/docs/channels#resource>
#[derive(Debug, Deserialize)]
pub struct Channel {
    /// The ID that YouTube uses to uniquely identify the channel.
    pub id: String,
    pub snippet: ChannelSnippet,
    #[serde(default)]
    pub statistics: Option<ChannelStatistics>,
}

/// See: <https://developers.google.com/youtube/v3/docs/channels#snippet>
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSnippet {
    /// The channel's title.
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// The channel's handle, e.g. `@example`.
    #[serde(default)]
    pub custom_url: Option<String>,
    #[serde(default)]
    pub thumbnails: Thumbnails,
}

/// See: <https://developers.google.com/youtube/v3/docs/channels#statistics>
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStatistics {
    pub view_count: Option<String>,
    /// Absent when the owner hides their subscriber count.
    pub subscriber_count: Option<String>,
    pub video_count: Option<String>,
}

impl From<Channel> for ChannelSummary {
    fn from(channel: Channel) -> Self {
        let statistics = channel.statistics.unwrap_or_default();
        ChannelSummary {
            id: channel.id,
            title: channel.snippet.title,
            description: channel.snippet.description,
            custom_url: channel.snippet.custom_url.unwrap_or_default(),
            thumbnails: channel.snippet.thumbnails,
            subscriber_count: parse_count(
                "subscriberCount",
                statistics.subscriber_count.as_deref(),
            ),
            video_count: parse_count("videoCount", statistics.video_count.as_deref()),
            view_count: parse_count("viewCount", statistics.view_count.as_deref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_json_snapshot;
    use serde_json::json;

    #[test]
    fn channel_summary() {
        let response: ChannelListResponse = serde_json::from_value(json!({
            "kind": "youtube#channelListResponse",
            "items": [{
                "id": "UC123",
                "snippet": {
                    "title": "Example Channel",
                    "description": "Videos about examples.",
                    "customUrl": "@example",
                    "publishedAt": "2015-03-01T00:00:00Z",
                    "thumbnails": {
                        "default": {
                            "url": "https://yt3.ggpht.com/c.jpg",
                            "width": 88,
                            "height": 88
                        }
                    }
                },
                "statistics": {
                    "viewCount": "123456",
                    "subscriberCount": "7890",
                    "hiddenSubscriberCount": false,
                    "videoCount": "42"
                }
            }]
        }))
        .unwrap();

        let summary = ChannelSummary::from(response.items.into_iter().next().unwrap());
        assert_json_snapshot!(summary, @r#"
        {
          "id": "UC123",
          "title": "Example Channel",
          "description": "Videos about examples.",
          "customUrl": "@example",
          "thumbnails": {
            "default": {
              "url": "https://yt3.ggpht.com/c.jpg",
              "width": 88,
              "height": 88
            }
          },
          "subscriberCount": 7890,
          "videoCount": 42,
          "viewCount": 123456
        }
        "#);
    }

    #[test]
    fn unknown_channel_has_no_items() {
        let response: ChannelListResponse =
            serde_json::from_value(json!({ "kind": "youtube#channelListResponse" })).unwrap();
        assert!(response.items.is_empty());
    }
}
