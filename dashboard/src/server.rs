//! The dashboard's JSON API over HTTP/1.
//!
//! | Route                           | Response          |
//! |---------------------------------|-------------------|
//! | `GET /api/videos`               | `VideoPage`       |
//! | `GET /api/videos/popular`       | `VideoPage`       |
//! | `GET /api/channel`              | `ChannelSummary`  |
//! | `GET /api/analytics/views`      | `DailyViews[]`    |
//! | `GET /api/analytics/geo`        | `CountryViews[]`  |
//! | `GET /api/analytics/video`      | `VideoRetention`  |
//!
//! Every error is a JSON [`ErrorBody`]. Upstream failures are logged in full but reported to the
//! caller only as a fixed message.

use crate::config::Config;
use crate::service::Dashboard;
use bytes::Bytes;
use eyre::Context;
use http::header::{AUTHORIZATION, CONTENT_TYPE, HeaderValue};
use http::request::Parts;
use http::{Method, Request, Response, StatusCode};
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use serde::Serialize;
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinSet;
use ytdash_sdk::protocol::ErrorBody;

/// A request that could not be served, and what the caller is told about it.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(&'static str),
    Unauthorized,
    NotFound(&'static str),
    MethodNotAllowed,
    Upstream {
        message: &'static str,
        report: eyre::Report,
    },
}

impl ApiError {
    fn upstream(message: &'static str) -> impl FnOnce(eyre::Report) -> Self {
        move |report| ApiError::Upstream { message, report }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            ApiError::BadRequest(message) | ApiError::NotFound(message) => message,
            ApiError::Unauthorized => "Unauthorized",
            ApiError::MethodNotAllowed => "Method not allowed",
            ApiError::Upstream { message, .. } => message,
        }
    }

    pub fn into_response(self) -> Response<Full<Bytes>> {
        if let ApiError::Upstream { message, report } = &self {
            tracing::error!(error = ?report, "{message}");
        }
        let status = self.status();
        json_response(status, &ErrorBody::new(self.message()))
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let (status, body) = match serde_json::to_vec(body) {
        Ok(body) => (status, body),
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize response body");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                br#"{"error":"Internal server error"}"#.to_vec(),
            )
        }
    };
    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

/// Decoded query string parameters.
#[derive(Debug, Default)]
struct Query(Vec<(String, String)>);

impl Query {
    fn parse(query: Option<&str>) -> Self {
        Self(
            form_urlencoded::parse(query.unwrap_or("").as_bytes())
                .into_owned()
                .collect(),
        )
    }

    /// The first non-empty value of `key`.
    fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, v)| k == key && !v.is_empty())
            .map(|(_, v)| v.as_str())
    }

    fn require(&self, key: &str, message: &'static str) -> Result<&str, ApiError> {
        self.get(key).ok_or(ApiError::BadRequest(message))
    }
}

/// The access token of an `Authorization: Bearer …` header.
fn bearer_token(req: &Parts) -> Result<&str, ApiError> {
    let header = req
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;
    let (scheme, token) = header.split_once(' ').ok_or(ApiError::Unauthorized)?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(ApiError::Unauthorized);
    }
    Ok(token)
}

const ROUTES: &[&str] = &[
    "/api/videos",
    "/api/videos/popular",
    "/api/channel",
    "/api/analytics/views",
    "/api/analytics/geo",
    "/api/analytics/video",
];

async fn route(dashboard: &Dashboard, req: &Parts) -> Result<Response<Full<Bytes>>, ApiError> {
    let path = req.uri.path().trim_end_matches('/');
    if !ROUTES.contains(&path) {
        return Err(ApiError::NotFound("Not found"));
    }
    if req.method != Method::GET {
        return Err(ApiError::MethodNotAllowed);
    }
    let query = Query::parse(req.uri.query());

    match path {
        "/api/videos" => {
            let channel_id = query.require("channelId", "Channel ID is required")?;
            let page = dashboard
                .videos_page(channel_id, query.get("pageToken"))
                .await
                .map_err(ApiError::upstream("Failed to fetch videos"))?;
            Ok(json_response(StatusCode::OK, &page))
        }
        "/api/videos/popular" => {
            let channel_id = query.require("channelId", "Channel ID is required")?;
            let page = dashboard
                .most_popular(channel_id)
                .await
                .map_err(ApiError::upstream("Failed to fetch videos"))?;
            Ok(json_response(StatusCode::OK, &page))
        }
        "/api/channel" => {
            let channel_id = query.require("channelId", "Channel ID is required")?;
            let channel = dashboard
                .channel_summary(channel_id)
                .await
                .map_err(ApiError::upstream("Failed to fetch channel info"))?
                .ok_or(ApiError::NotFound("Channel not found"))?;
            Ok(json_response(StatusCode::OK, &channel))
        }
        "/api/analytics/views" => {
            let token = bearer_token(req)?;
            let views = dashboard
                .daily_views(token)
                .await
                .map_err(ApiError::upstream("Failed to fetch analytics"))?;
            Ok(json_response(StatusCode::OK, &views))
        }
        "/api/analytics/geo" => {
            let token = bearer_token(req)?;
            let views = dashboard
                .country_views(token)
                .await
                .map_err(ApiError::upstream("Failed to fetch analytics"))?;
            Ok(json_response(StatusCode::OK, &views))
        }
        "/api/analytics/video" => {
            let token = bearer_token(req)?;
            let video_id = query.require("videoId", "Video ID is required")?;
            let retention = dashboard
                .video_retention(token, video_id)
                .await
                .map_err(ApiError::upstream("Failed to fetch analytics"))?;
            Ok(json_response(StatusCode::OK, &retention))
        }
        _ => Err(ApiError::NotFound("Not found")),
    }
}

/// Serves one request; never fails, errors become JSON error responses.
pub async fn handle<B>(dashboard: &Dashboard, req: Request<B>) -> Response<Full<Bytes>> {
    // no route reads a request body
    let (req, _) = req.into_parts();
    let response = match route(dashboard, &req).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    };
    tracing::info!(
        method = %req.method,
        path = req.uri.path(),
        status = response.status().as_u16(),
        "served request"
    );
    response
}

/// A bound, not yet running, API server.
pub struct Server {
    listener: TcpListener,
    dashboard: Arc<Dashboard>,
}

impl Server {
    pub async fn bind(config: &Config) -> eyre::Result<Self> {
        let dashboard = Dashboard::new(config)?;
        let listener = TcpListener::bind(config.listen)
            .await
            .with_context(|| format!("bind to {}", config.listen))?;
        Ok(Self {
            listener,
            dashboard: Arc::new(dashboard),
        })
    }

    pub fn local_addr(&self) -> eyre::Result<SocketAddr> {
        self.listener.local_addr().context("get local address")
    }

    /// Serves until Ctrl-C.
    pub async fn run(self) -> eyre::Result<()> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Serves until `shutdown` resolves, then lets open connections finish their current request.
    pub async fn run_until(self, shutdown: impl Future<Output = ()>) -> eyre::Result<()> {
        let (stop, stopped) = watch::channel(());
        let mut connections = JoinSet::new();
        let mut shutdown = std::pin::pin!(shutdown);

        tracing::info!(addr = %self.local_addr()?, "listening");
        loop {
            tokio::select! {
                () = &mut shutdown => break,
                accepted = self.listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(accepted) => accepted,
                        Err(e) => {
                            tracing::warn!(error = %e, "failed to accept connection");
                            continue;
                        }
                    };
                    let dashboard = Arc::clone(&self.dashboard);
                    let mut stopped = stopped.clone();
                    connections.spawn(async move {
                        let service = service_fn(move |req: Request<Incoming>| {
                            let dashboard = Arc::clone(&dashboard);
                            async move { Ok::<_, Infallible>(handle(&dashboard, req).await) }
                        });
                        let mut conn = std::pin::pin!(
                            http1::Builder::new().serve_connection(TokioIo::new(stream), service)
                        );
                        let result = tokio::select! {
                            result = conn.as_mut() => result,
                            _ = stopped.changed() => {
                                conn.as_mut().graceful_shutdown();
                                conn.await
                            }
                        };
                        if let Err(e) = result {
                            tracing::debug!(%peer, error = %e, "connection closed with error");
                        }
                    });
                }
                Some(_) = connections.join_next(), if !connections.is_empty() => {}
            }
        }

        tracing::info!(connections = connections.len(), "shutting down");
        stop.send_replace(());
        while connections.join_next().await.is_some() {}
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use pretty_assertions::assert_eq;

    fn offline_dashboard() -> Dashboard {
        // nothing listens on the discard port; any upstream call fails
        let config = Config::builder()
            .api_key("test-key")
            .data_api_base("http://127.0.0.1:9")
            .analytics_api_base("http://127.0.0.1:9")
            .build()
            .unwrap();
        Dashboard::new(&config).unwrap()
    }

    async fn call(req: Request<()>) -> (StatusCode, serde_json::Value) {
        let response = handle(&offline_dashboard(), req).await;
        let status = response.status();
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn get(uri: &str) -> Request<()> {
        Request::get(uri).body(()).unwrap()
    }

    #[tokio::test]
    async fn missing_channel_id() {
        let (status, body) = call(get("/api/videos")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, serde_json::json!({ "error": "Channel ID is required" }));

        let (status, _) = call(get("/api/videos?channelId=")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = call(get("/api/channel?pageToken=abc")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_path_and_method() {
        let (status, body) = call(get("/api/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, serde_json::json!({ "error": "Not found" }));

        let post = Request::post("/api/videos?channelId=UC1").body(()).unwrap();
        let (status, body) = call(post).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body, serde_json::json!({ "error": "Method not allowed" }));
    }

    #[tokio::test]
    async fn analytics_requires_bearer_token() {
        for uri in [
            "/api/analytics/views",
            "/api/analytics/geo",
            "/api/analytics/video?videoId=a1",
        ] {
            let (status, body) = call(get(uri)).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
            assert_eq!(body, serde_json::json!({ "error": "Unauthorized" }));
        }

        let basic = Request::get("/api/analytics/views")
            .header(AUTHORIZATION, "Basic dXNlcjpwYXNz")
            .body(())
            .unwrap();
        let (status, _) = call(basic).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn retention_requires_video_id() {
        let req = Request::get("/api/analytics/video")
            .header(AUTHORIZATION, "Bearer ya29.token")
            .body(())
            .unwrap();
        let (status, body) = call(req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, serde_json::json!({ "error": "Video ID is required" }));
    }

    #[tokio::test]
    async fn upstream_failure_is_not_leaked() {
        let (status, body) = call(get("/api/videos?channelId=UC1")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, serde_json::json!({ "error": "Failed to fetch videos" }));
    }

    #[tokio::test]
    async fn stops_on_shutdown_signal() {
        let config = Config::builder()
            .api_key("test-key")
            .listen(SocketAddr::from(([127, 0, 0, 1], 0)))
            .build()
            .unwrap();
        let server = Server::bind(&config).await.unwrap();
        let (stop, stopped) = tokio::sync::oneshot::channel::<()>();
        let task = tokio::spawn(server.run_until(async {
            let _ = stopped.await;
        }));
        stop.send(()).unwrap();
        tokio::time::timeout(std::time::Duration::from_secs(5), task)
            .await
            .expect("server did not stop")
            .unwrap()
            .unwrap();
    }

    #[test]
    fn query_values() {
        let query = Query::parse(Some("channelId=UC%201&pageToken=&pageToken=CAwQAA"));
        assert_eq!(query.get("channelId"), Some("UC 1"));
        assert_eq!(query.get("pageToken"), Some("CAwQAA"));
        assert_eq!(query.get("videoId"), None);
        assert_eq!(Query::parse(None).get("channelId"), None);
    }

    #[test]
    fn bearer_tokens() {
        let with = |value: &str| {
            Request::get("/")
                .header(AUTHORIZATION, value)
                .body(())
                .unwrap()
                .into_parts()
                .0
        };
        assert_eq!(bearer_token(&with("Bearer abc")).unwrap(), "abc");
        assert_eq!(bearer_token(&with("bearer  abc ")).unwrap(), "abc");
        assert!(bearer_token(&with("Bearer ")).is_err());
        assert!(bearer_token(&with("Token abc")).is_err());
        assert!(bearer_token(&get("/").into_parts().0).is_err());
    }
}
