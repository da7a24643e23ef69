//! YouTube Search API types.

use crate::youtube_api::types::PageInfo;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ytdash_sdk::protocol::{Thumbnails, VideoSnippet};

/// Ordering of a channel's search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchOrder {
    /// Newest upload first.
    #[default]
    Date,
    /// Most viewed first.
    ViewCount,
}

impl SearchOrder {
    pub fn as_query_value(self) -> &'static str {
        match self {
            SearchOrder::Date => "date",
            SearchOrder::ViewCount => "viewCount",
        }
    }
}

/// Response structure for the `search.list` API call.
///
/// See: <https://developers.google.com/youtube/v3/docs/search/list>
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchListResponse {
    #[serde(default)]
    pub items: Vec<SearchResult>,
    #[serde(default)]
    pub page_info: PageInfo,
    /// Token that can be used as the value of the pageToken parameter to retrieve the next page.
    #[serde(default)]
    pub next_page_token: Option<String>,
}

impl SearchListResponse {
    /// Splits the response into the videos it contains and the cursor past them.
    ///
    /// Results without a video id (channels and playlists can show up despite `type=video`)
    /// are dropped, and an empty cursor is treated as no cursor at all.
    pub fn into_videos(self) -> (Vec<RawVideo>, Option<String>) {
        let videos = self
            .items
            .into_iter()
            .filter_map(SearchResult::into_video)
            .collect();
        let next_page_token = self.next_page_token.filter(|token| !token.is_empty());
        (videos, next_page_token)
    }
}

/// One entry of a search response, before it is known to be a video.
#[derive(Debug, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub snippet: Value,
}

impl SearchResult {
    /// The video this result describes, or `None` if it has no video id.
    ///
    /// Only the id decides whether a result is kept. A snippet that does not parse keeps
    /// whichever of its fields do.
    pub fn into_video(self) -> Option<RawVideo> {
        let id = match serde_json::from_value::<ResourceId>(self.id) {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(error = %e, "skipping search result without a video id");
                return None;
            }
        };
        if self.snippet.is_null() {
            return Some(RawVideo {
                id,
                snippet: VideoSnippet::default(),
            });
        }
        let snippet = match serde_json::from_value::<VideoSnippet>(self.snippet.clone()) {
            Ok(snippet) => snippet,
            Err(e) => {
                tracing::warn!(
                    video_id = id.video_id(),
                    error = %e,
                    "malformed video snippet; keeping the fields that parse"
                );
                salvage_snippet(&self.snippet)
            }
        };
        Some(RawVideo { id, snippet })
    }
}

fn field<T: DeserializeOwned>(object: &Value, name: &str) -> Option<T> {
    serde_json::from_value(object.get(name)?.clone()).ok()
}

fn salvage_snippet(snippet: &Value) -> VideoSnippet {
    let thumbnails = snippet.get("thumbnails").unwrap_or(&Value::Null);
    VideoSnippet {
        title: field(snippet, "title").unwrap_or_default(),
        description: field(snippet, "description"),
        published_at: field(snippet, "publishedAt"),
        channel_title: field(snippet, "channelTitle"),
        thumbnails: Thumbnails {
            default: field(thumbnails, "default"),
            medium: field(thumbnails, "medium"),
            high: field(thumbnails, "high"),
        },
    }
}

/// A search hit for a video: an identifier plus the snippet describing it.
///
/// See: <https://developers.google.com/youtube/v3/docs/search#resource>
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawVideo {
    pub id: ResourceId,
    #[serde(default)]
    pub snippet: VideoSnippet,
}

/// The id of a search result.
///
/// Search returns `{"kind": "youtube#video", "videoId": "…"}`, while other list endpoints and
/// cached payloads carry the bare id string. Both are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceId {
    Bare(String),
    Nested {
        #[serde(rename = "videoId")]
        video_id: String,
    },
}

impl ResourceId {
    /// The bare video id.
    pub fn video_id(&self) -> &str {
        match self {
            ResourceId::Bare(id) => id,
            ResourceId::Nested { video_id } => video_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn ids_normalize() {
        let nested: ResourceId =
            serde_json::from_value(json!({ "kind": "youtube#video", "videoId": "xyz" })).unwrap();
        let bare: ResourceId = serde_json::from_value(json!("xyz")).unwrap();
        assert_eq!(nested.video_id(), "xyz");
        assert_eq!(bare.video_id(), "xyz");
    }

    #[test]
    fn search_response_keeps_only_videos() {
        let response: SearchListResponse = serde_json::from_value(json!({
            "kind": "youtube#searchListResponse",
            "nextPageToken": "CAwQAA",
            "pageInfo": { "totalResults": 31, "resultsPerPage": 12 },
            "items": [
                {
                    "kind": "youtube#searchResult",
                    "id": { "kind": "youtube#video", "videoId": "a1" },
                    "snippet": {
                        "title": "First",
                        "publishedAt": "2024-05-01T12:00:00Z",
                        "thumbnails": { "high": { "url": "https://i.ytimg.com/vi/a1/hq.jpg" } }
                    }
                },
                {
                    "kind": "youtube#searchResult",
                    "id": { "kind": "youtube#channel", "channelId": "UC123" }
                },
                {
                    "kind": "youtube#searchResult",
                    "id": { "kind": "youtube#video", "videoId": "b2" }
                }
            ]
        }))
        .unwrap();

        assert_eq!(response.page_info.total_results, 31);
        let (videos, next) = response.into_videos();
        let ids: Vec<_> = videos.iter().map(|v| v.id.video_id()).collect();
        assert_eq!(ids, ["a1", "b2"]);
        assert_eq!(videos[0].snippet.title, "First");
        assert_eq!(videos[1].snippet.title, "");
        assert_eq!(next.as_deref(), Some("CAwQAA"));
    }

    #[test]
    fn malformed_snippet_keeps_the_video() {
        let response: SearchListResponse = serde_json::from_value(json!({
            "items": [
                {
                    "id": { "kind": "youtube#video", "videoId": "a1" },
                    "snippet": {
                        "title": null,
                        "publishedAt": "2024-05-01T12:00:00Z",
                        "thumbnails": { "high": { "url": "https://i.ytimg.com/vi/a1/hq.jpg" } }
                    }
                },
                {
                    "id": { "kind": "youtube#video", "videoId": "b2" },
                    "snippet": {
                        "title": "Second",
                        "thumbnails": {
                            "default": { "width": 120 },
                            "medium": { "url": "https://i.ytimg.com/vi/b2/mq.jpg" }
                        }
                    }
                },
                { "id": null, "snippet": { "title": "Nothing to watch" } }
            ]
        }))
        .unwrap();

        let (videos, _) = response.into_videos();
        let ids: Vec<_> = videos.iter().map(|v| v.id.video_id()).collect();
        assert_eq!(ids, ["a1", "b2"]);

        assert_eq!(videos[0].snippet.title, "");
        assert!(videos[0].snippet.published_at.is_some());
        assert!(videos[0].snippet.thumbnails.high.is_some());

        assert_eq!(videos[1].snippet.title, "Second");
        assert_eq!(videos[1].snippet.thumbnails.default, None);
        assert_eq!(
            videos[1].snippet.thumbnails.best().map(|t| t.url.as_str()),
            Some("https://i.ytimg.com/vi/b2/mq.jpg")
        );
    }

    #[test]
    fn empty_cursor_means_last_page() {
        let response: SearchListResponse =
            serde_json::from_value(json!({ "items": [], "nextPageToken": "" })).unwrap();
        let (videos, next) = response.into_videos();
        assert!(videos.is_empty());
        assert_eq!(next, None);
    }

    #[test]
    fn missing_items_is_empty() {
        let response: SearchListResponse = serde_json::from_value(json!({})).unwrap();
        let (videos, next) = response.into_videos();
        assert!(videos.is_empty());
        assert_eq!(next, None);
    }

    #[test]
    fn order_query_values() {
        assert_eq!(SearchOrder::Date.as_query_value(), "date");
        assert_eq!(SearchOrder::ViewCount.as_query_value(), "viewCount");
    }
}
