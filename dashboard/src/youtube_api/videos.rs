//! YouTube Videos API types.

use crate::youtube_api::types::parse_count;
use serde::Deserialize;
use ytdash_sdk::protocol::VideoStatistics;

/// Response structure for the `videos.list` API call with `part=statistics`.
///
/// Ids that upstream does not know (deleted or private videos) are simply absent from `items`.
///
/// See: <https://developers.google.com/youtube/v3/docs/videos/list>
#[derive(Debug, Deserialize)]
pub struct VideoListResponse {
    /// A list of videos that match the request criteria.
    #[serde(default)]
    pub items: Vec<Video>,
}

impl VideoListResponse {
    /// Pairs each returned video id with its parsed statistics.
    pub fn into_statistics(self) -> Vec<(String, VideoStatistics)> {
        self.items
            .into_iter()
            .map(|video| {
                let statistics = video.statistics.unwrap_or_default().parse();
                (video.id, statistics)
            })
            .collect()
    }
}

/// A `video` resource represents a YouTube video.
///
/// See: <https://developers.google.com/youtube/v3/docs/videos#resource>
#[derive(Debug, Deserialize)]
pub struct Video {
    /// The ID that YouTube uses to uniquely identify the video.
    pub id: String,
    /// Contains statistics about the video.
    #[serde(default)]
    pub statistics: Option<RawVideoStatistics>,
}

/// Statistics about the video, as upstream encodes them (decimal strings).
///
/// See: <https://developers.google.com/youtube/v3/docs/videos#statistics>
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawVideoStatistics {
    /// The number of times the video has been viewed.
    pub view_count: Option<String>,
    /// The number of users who have indicated that they liked the video.
    ///
    /// Absent when the owner hides likes.
    pub like_count: Option<String>,
    /// The number of comments for the video.
    ///
    /// Absent when comments are disabled.
    pub comment_count: Option<String>,
}

impl RawVideoStatistics {
    pub fn parse(&self) -> VideoStatistics {
        VideoStatistics {
            view_count: parse_count("viewCount", self.view_count.as_deref()),
            like_count: parse_count("likeCount", self.like_count.as_deref()),
            comment_count: parse_count("commentCount", self.comment_count.as_deref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn statistics_are_parsed() {
        let response: VideoListResponse = serde_json::from_value(json!({
            "kind": "youtube#videoListResponse",
            "items": [
                {
                    "id": "a1",
                    "statistics": {
                        "viewCount": "1500",
                        "likeCount": "12",
                        "favoriteCount": "0",
                        "commentCount": "3"
                    }
                },
                { "id": "b2", "statistics": { "viewCount": "7" } },
                { "id": "c3" }
            ]
        }))
        .unwrap();

        assert_eq!(
            response.into_statistics(),
            [
                (
                    "a1".to_string(),
                    VideoStatistics {
                        view_count: Some(1500),
                        like_count: Some(12),
                        comment_count: Some(3),
                    }
                ),
                (
                    "b2".to_string(),
                    VideoStatistics {
                        view_count: Some(7),
                        like_count: None,
                        comment_count: None,
                    }
                ),
                ("c3".to_string(), VideoStatistics::default()),
            ]
        );
    }

    #[test]
    fn unknown_ids_are_absent() {
        let response: VideoListResponse =
            serde_json::from_value(json!({ "kind": "youtube#videoListResponse" })).unwrap();
        assert!(response.into_statistics().is_empty());
    }
}
