use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode, Url};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::ClientError;
use crate::models::{ErrorReply, Stats, UpdateReply};

const UPDATE_FALLBACK_MESSAGE: &str = "Update completed";

/// HTTP client for the news summarizer backend.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url =
            Url::parse(base_url).with_context(|| format!("invalid server URL: {}", base_url))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("server URL cannot be used as a base: {}", base_url);
        }
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// `POST /update/{source}`. Returns the backend's message on success.
    pub async fn trigger_update(&self, source: &str) -> Result<String, ClientError> {
        let url = self.endpoint(&["update", source]);
        debug!(%url, "triggering update");
        let resp = self
            .http
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(request_failed(status, &body));
        }
        let reply: UpdateReply = serde_json::from_str(&body)?;
        info!(source, status = status.as_u16(), updated = ?reply.updated, "update finished");
        Ok(reply
            .message
            .unwrap_or_else(|| UPDATE_FALLBACK_MESSAGE.to_string()))
    }

    /// `GET /status`.
    pub async fn fetch_stats(&self) -> Result<Stats, ClientError> {
        let url = self.endpoint(&["status"]);
        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(request_failed(status, &body));
        }
        Ok(serde_json::from_str(&body)?)
    }
}

fn request_failed(status: StatusCode, body: &str) -> ClientError {
    let detail = serde_json::from_str::<ErrorReply>(body)
        .ok()
        .and_then(|reply| reply.detail_text())
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });
    ClientError::RequestFailed {
        status: status.as_u16(),
        detail,
    }
}

/// Work the UI thread hands to the background worker.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCommand {
    Update(String),
    RefreshStats,
}

/// Results the worker hands back to the UI thread.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiEvent {
    Updated {
        source: String,
        result: Result<String, ClientError>,
    },
    Stats(Result<Stats, ClientError>),
}

/// Runs until the command channel closes. Each command gets its own task so
/// a slow scrape never holds back a stats refresh.
pub async fn run_worker(
    client: ApiClient,
    mut commands: mpsc::Receiver<ApiCommand>,
    events: mpsc::Sender<ApiEvent>,
) {
    while let Some(command) = commands.recv().await {
        let client = client.clone();
        let events = events.clone();
        tokio::spawn(async move {
            let event = match command {
                ApiCommand::Update(source) => {
                    let result = client.trigger_update(&source).await;
                    if let Err(e) = &result {
                        warn!(%source, error = %e, "update failed");
                    }
                    ApiEvent::Updated { source, result }
                }
                ApiCommand::RefreshStats => ApiEvent::Stats(client.fetch_stats().await),
            };
            if events.send(event).await.is_err() {
                debug!("ui gone, dropping api event");
            }
        });
    }
    debug!("command channel closed, api worker stopping");
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::extract::Path;
    use axum::http::HeaderMap;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};

    async fn update_handler(
        Path(source): Path<String>,
        headers: HeaderMap,
    ) -> (axum::http::StatusCode, Json<Value>) {
        use axum::http::StatusCode;
        let is_json = headers
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("application/json"));
        if !is_json {
            return (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                Json(json!({"detail": "missing content type"})),
            );
        }
        match source.as_str() {
            "arxiv" => (
                StatusCode::OK,
                Json(json!({"message": "Added 3 arXiv papers", "source": "arxiv", "updated": true})),
            ),
            "youtube" => (
                StatusCode::CREATED,
                Json(json!({"message": "YouTube videos already exist for today", "updated": false})),
            ),
            "news" => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"detail": "Error updating news: timeout"})),
            ),
            _ => (StatusCode::NOT_FOUND, Json(json!({"detail": "Not Found"}))),
        }
    }

    async fn status_handler() -> Json<Value> {
        Json(json!({
            "total_articles": 12,
            "by_source": {"TheVerge": 5, "arXiv": 4, "YouTube": 3}
        }))
    }

    async fn spawn_backend() -> String {
        let app = Router::new()
            .route("/update/{source}", post(update_handler))
            .route("/status", get(status_handler))
            .route("/broken/status", get(|| async { "<html>oops</html>" }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn closed_port_url() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}", addr)
    }

    fn client(base: &str) -> ApiClient {
        ApiClient::new(base, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_trigger_update_success_returns_message() {
        let base = spawn_backend().await;
        let message = client(&base).trigger_update("arxiv").await.unwrap();
        assert_eq!(message, "Added 3 arXiv papers");
    }

    #[tokio::test]
    async fn test_trigger_update_created_counts_as_success() {
        let base = spawn_backend().await;
        let message = client(&base).trigger_update("youtube").await.unwrap();
        assert_eq!(message, "YouTube videos already exist for today");
    }

    #[tokio::test]
    async fn test_trigger_update_failure_carries_detail() {
        let base = spawn_backend().await;
        let err = client(&base).trigger_update("news").await.unwrap_err();
        assert_eq!(
            err,
            ClientError::RequestFailed {
                status: 500,
                detail: "Error updating news: timeout".into()
            }
        );
    }

    #[tokio::test]
    async fn test_trigger_update_unreachable_is_transport_error() {
        let base = closed_port_url().await;
        let err = client(&base).trigger_update("all").await.unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_fetch_stats() {
        let base = spawn_backend().await;
        let stats = client(&base).fetch_stats().await.unwrap();
        assert_eq!(stats.total_articles, 12);
        assert_eq!(stats.by_source[0], ("TheVerge".to_string(), 5));
        assert_eq!(stats.by_source.len(), 3);
    }

    #[tokio::test]
    async fn test_fetch_stats_under_path_prefix_with_bad_body() {
        let base = spawn_backend().await;
        let err = client(&format!("{}/broken", base))
            .fetch_stats()
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)), "got {err:?}");
    }

    #[test]
    fn test_endpoint_keeps_base_path_and_encodes_source() {
        let api = client("http://localhost:8000/dashboard/");
        assert_eq!(
            api.endpoint(&["update", "all"]).as_str(),
            "http://localhost:8000/dashboard/update/all"
        );
        let api = client("http://localhost:8000");
        assert_eq!(
            api.endpoint(&["update", "a b"]).as_str(),
            "http://localhost:8000/update/a%20b"
        );
    }

    #[test]
    fn test_request_failed_falls_back_to_body_then_reason() {
        let err = request_failed(StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(err.to_string(), "upstream down");
        let err = request_failed(StatusCode::BAD_GATEWAY, "");
        assert_eq!(err.to_string(), "Bad Gateway");
    }

    #[tokio::test]
    async fn test_worker_answers_each_command() {
        let base = spawn_backend().await;
        let (cmd_tx, cmd_rx) = mpsc::channel(4);
        let (event_tx, mut event_rx) = mpsc::channel(4);
        tokio::spawn(run_worker(client(&base), cmd_rx, event_tx));

        cmd_tx.send(ApiCommand::Update("arxiv".into())).await.unwrap();
        let event = tokio::time::timeout(Duration::from_secs(5), event_rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            event,
            ApiEvent::Updated {
                source: "arxiv".into(),
                result: Ok("Added 3 arXiv papers".into())
            }
        );

        cmd_tx.send(ApiCommand::RefreshStats).await.unwrap();
        let event = tokio::time::timeout(Duration::from_secs(5), event_rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(event, ApiEvent::Stats(Ok(ref s)) if s.total_articles == 12));
    }
}
