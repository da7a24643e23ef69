//! Shared types and streaming infrastructure for the YouTube API client.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context as TaskContext, Poll};
use tokio_stream::Stream;

/// One page of a list endpoint, together with the cursor that leads past it.
#[derive(Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_page_token: Option<String>,
}

type OneFuturePage<'a, F, T> =
    Pin<Box<dyn Future<Output = eyre::Result<(F, Page<T>)>> + 'a + Send>>;

/// A stream of whole pages from a YouTube API list endpoint.
///
/// The first page is requested on the first poll; each following page is requested only once
/// the previous one has been handed out, using exactly the `nextPageToken` upstream returned.
/// The stream ends after the page without a token, after `max_pages` pages, or after the first
/// error.
pub struct PageStream<'a, T, F> {
    /// Future representing the currently pending API request, if any
    pending_request: Option<OneFuturePage<'a, F, T>>,
    /// Pages still allowed to be fetched, including the pending one
    remaining_pages: usize,
}

impl<'a, T, F> PageStream<'a, T, F> {
    pub fn new<Fut>(fetcher: F, max_pages: usize) -> Self
    where
        F: Fn(Option<String>) -> Fut,
        F: Send + 'a,
        Fut: Future<Output = eyre::Result<Page<T>>> + Send + 'a,
    {
        if max_pages == 0 {
            return Self {
                pending_request: None,
                remaining_pages: 0,
            };
        }
        let first_page = async move {
            let page = fetcher(None).await?;
            Ok((fetcher, page))
        };
        Self {
            pending_request: Some(Box::pin(first_page)),
            remaining_pages: max_pages,
        }
    }
}

impl<'a, T, F> Unpin for PageStream<'a, T, F> {}

impl<'a, T, F, Fut> Stream for PageStream<'a, T, F>
where
    F: Fn(Option<String>) -> Fut,
    F: Send + 'a,
    Fut: Future<Output = eyre::Result<Page<T>>> + Send + 'a,
{
    type Item = eyre::Result<Page<T>>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<Option<Self::Item>> {
        let Some(pending) = self.pending_request.as_mut() else {
            return Poll::Ready(None);
        };

        match pending.as_mut().poll(cx) {
            Poll::Ready(Ok((fetcher, page))) => {
                self.remaining_pages -= 1;
                self.pending_request = match &page.next_page_token {
                    Some(token) if self.remaining_pages > 0 => {
                        let token = token.clone();
                        Some(Box::pin(async move {
                            let page = fetcher(Some(token)).await?;
                            Ok((fetcher, page))
                        }))
                    }
                    _ => None,
                };
                Poll::Ready(Some(Ok(page)))
            }
            Poll::Ready(Err(e)) => {
                self.pending_request = None;
                Poll::Ready(Some(Err(e)))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Paging details for lists of resources.
///
/// See: <https://developers.google.com/youtube/v3/docs/pageInfo>
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// The total number of results in the result set.
    ///
    /// For searches this is an approximation.
    #[serde(default)]
    pub total_results: u32,
    /// The number of results included in the API response.
    #[serde(default)]
    pub results_per_page: u32,
}

/// Parses one of the decimal-string counters the Data API uses for statistics.
///
/// Counters that are missing or not a non-negative integer become `None`.
pub(crate) fn parse_count(field: &'static str, raw: Option<&str>) -> Option<u64> {
    let raw = raw?;
    match raw.parse() {
        Ok(count) => Some(count),
        Err(e) => {
            tracing::warn!(field, value = raw, error = %e, "ignoring malformed counter");
            None
        }
    }
}
