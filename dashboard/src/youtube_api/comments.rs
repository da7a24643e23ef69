//! YouTube CommentThreads API types.

use jiff::Timestamp;
use serde::Deserialize;
use ytdash_sdk::protocol::Comment;

/// Response structure for the `commentThreads.list` API call.
///
/// See: <https://developers.google.com/youtube/v3/docs/commentThreads/list>
#[derive(Debug, Deserialize)]
pub struct CommentThreadListResponse {
    #[serde(default)]
    pub items: Vec<CommentThread>,
}

impl CommentThreadListResponse {
    pub fn into_comments(self) -> Vec<Comment> {
        self.items.into_iter().map(CommentThread::into_comment).collect()
    }
}

/// A top-level comment and (not fetched here) its replies.
///
/// See: <https://developers.google.com/youtube/v3/docs/commentThreads#resource>
#[derive(Debug, Deserialize)]
pub struct CommentThread {
    pub id: String,
    pub snippet: CommentThreadSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentThreadSnippet {
    pub top_level_comment: TopLevelComment,
}

#[derive(Debug, Deserialize)]
pub struct TopLevelComment {
    pub snippet: CommentSnippet,
}

/// See: <https://developers.google.com/youtube/v3/docs/comments#snippet>
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentSnippet {
    #[serde(default)]
    pub author_display_name: String,
    #[serde(default)]
    pub author_profile_image_url: Option<String>,
    /// The comment text as it was originally posted.
    #[serde(default)]
    pub text_original: String,
    pub published_at: Timestamp,
}

impl CommentThread {
    fn into_comment(self) -> Comment {
        let snippet = self.snippet.top_level_comment.snippet;
        Comment {
            id: self.id,
            author_name: snippet.author_display_name,
            published_at: snippet.published_at,
            text: snippet.text_original,
            author_avatar_url: snippet.author_profile_image_url,
        }
    }
}
