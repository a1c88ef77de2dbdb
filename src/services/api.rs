//! HTTP access to the forum API and the background request worker.

use crate::model::{PostResponse, ThreadResponse};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub const DEFAULT_API_BASE: &str = "https://forums.trgwii.com/api";
pub const DEFAULT_ARCHIVE_BASE: &str = "https://web.archive.org/web/2";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("request failed with status {status}")]
    Status {
        status: StatusCode,
        /// `error` field of the response body, when the server sent one.
        message: Option<String>,
    },
    #[error("unexpected response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// Text shown to the user: the server's message when present,
    /// otherwise the error itself.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Status { message: Some(message), .. } if !message.is_empty() => message.clone(),
            other => {
                let text = other.to_string();
                if text.is_empty() {
                    "Failed to submit".to_string()
                } else {
                    text
                }
            }
        }
    }
}

#[derive(Serialize)]
struct PostReplyRequest<'a> {
    id: u64,
    text: &'a str,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

#[derive(Clone)]
pub struct ForumApi {
    client: Client,
    base: String,
    archive_base: String,
}

impl ForumApi {
    pub fn new(base: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base: base.into().trim_end_matches('/').to_string(),
            archive_base: DEFAULT_ARCHIVE_BASE.to_string(),
        })
    }

    pub fn with_archive_base(mut self, archive_base: impl Into<String>) -> Self {
        self.archive_base = archive_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn thread_url(&self, id: u64) -> String {
        format!("{}/thread/{id}", self.base)
    }

    /// Fetches a thread. An `ok: false` body is data, whatever the status.
    pub async fn fetch_thread(&self, id: u64) -> Result<ThreadResponse, ApiError> {
        self.get_thread_response(&self.thread_url(id)).await
    }

    pub async fn post_reply(&self, id: u64, text: &str) -> Result<PostResponse, ApiError> {
        let url = format!("{}/thread/post.json", self.base);
        let response = self
            .client
            .post(&url)
            .json(&PostReplyRequest { id, text })
            .send()
            .await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&bytes)
                .ok()
                .and_then(|body| body.error);
            return Err(ApiError::Status { status, message });
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Fetches the Wayback Machine copy of the thread endpoint.
    pub async fn recover_from_archive(&self, id: u64) -> Result<ThreadResponse, ApiError> {
        let url = format!("{}/{}", self.archive_base, self.thread_url(id));
        self.get_thread_response(&url).await
    }

    async fn get_thread_response(&self, url: &str) -> Result<ThreadResponse, ApiError> {
        debug!(%url, "GET");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        match serde_json::from_slice::<ThreadResponse>(&bytes) {
            Ok(parsed) => Ok(parsed),
            Err(_) if !status.is_success() => Err(ApiError::Status { status, message: None }),
            Err(e) => Err(e.into()),
        }
    }
}

/// Requests sent from the app to the worker.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCommand {
    FetchThread { id: u64, seq: u64 },
    PostReply { id: u64, text: String },
    RecoverFromArchive { id: u64 },
}

/// Results sent back from the worker.
#[derive(Debug)]
pub enum ApiEvent {
    ThreadLoaded { seq: u64, response: ThreadResponse },
    ThreadFetchFailed { seq: u64, error: ApiError },
    ReplyPosted(PostResponse),
    ReplyFailed(ApiError),
    ArchiveRecovered(ThreadResponse),
    ArchiveFailed(ApiError),
}

/// Runs each command on its own task so a slow post never blocks a fetch.
pub async fn run_worker(
    api: ForumApi,
    mut commands: mpsc::UnboundedReceiver<ApiCommand>,
    events: mpsc::UnboundedSender<ApiEvent>,
) {
    while let Some(command) = commands.recv().await {
        let api = api.clone();
        let events = events.clone();
        tokio::spawn(async move {
            let event = execute(&api, command).await;
            if events.send(event).is_err() {
                debug!("event receiver dropped");
            }
        });
    }
    info!("api worker stopped");
}

async fn execute(api: &ForumApi, command: ApiCommand) -> ApiEvent {
    match command {
        ApiCommand::FetchThread { id, seq } => match api.fetch_thread(id).await {
            Ok(response) => ApiEvent::ThreadLoaded { seq, response },
            Err(error) => {
                warn!(id, %error, "thread fetch failed");
                ApiEvent::ThreadFetchFailed { seq, error }
            }
        },
        ApiCommand::PostReply { id, text } => match api.post_reply(id, &text).await {
            Ok(response) => ApiEvent::ReplyPosted(response),
            Err(error) => {
                warn!(id, %error, "reply submission failed");
                ApiEvent::ReplyFailed(error)
            }
        },
        ApiCommand::RecoverFromArchive { id } => match api.recover_from_archive(id).await {
            Ok(response) => ApiEvent::ArchiveRecovered(response),
            Err(error) => {
                warn!(id, %error, "archive recovery failed");
                ApiEvent::ArchiveFailed(error)
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::{Path, State},
        http::StatusCode as AxumStatus,
        routing::{get, post},
        Json, Router,
    };
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};
    use tokio::net::TcpListener;

    #[derive(Clone, Default)]
    struct ServerState {
        posts: Arc<Mutex<Vec<Value>>>,
    }

    async fn get_thread(Path(id): Path<u64>) -> (AxumStatus, Json<Value>) {
        match id {
            1 => (
                AxumStatus::OK,
                Json(json!({
                    "ok": true,
                    "thread": {
                        "title": "First",
                        "text": "hello",
                        "hash": "op",
                        "created": "2024-01-01T00:00:00Z",
                        "modified": "2024-01-02T00:00:00Z",
                        "replies": [{"hash": "a", "text": "r1", "created": "2024-01-01T01:00:00Z"}]
                    }
                })),
            ),
            _ => (AxumStatus::NOT_FOUND, Json(json!({"ok": false, "error": "Thread not found"}))),
        }
    }

    async fn post_reply(
        State(state): State<ServerState>,
        Json(body): Json<Value>,
    ) -> (AxumStatus, Json<Value>) {
        let text = body["text"].as_str().unwrap_or_default().to_string();
        state.posts.lock().unwrap().push(body);
        match text.as_str() {
            "reject" => (AxumStatus::OK, Json(json!({"ok": false, "error": "Rejected"}))),
            "explode" => (AxumStatus::BAD_REQUEST, Json(json!({"ok": false, "error": "Bad input"}))),
            "crash" => (AxumStatus::INTERNAL_SERVER_ERROR, Json(json!({}))),
            _ => (AxumStatus::OK, Json(json!({"ok": true}))),
        }
    }

    async fn spawn_forum_server() -> (String, ServerState) {
        std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = ServerState::default();
        let app = Router::new()
            .route("/api/thread/:id", get(get_thread))
            .route("/api/thread/post.json", post(post_reply))
            .with_state(state.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        (format!("http://{addr}"), state)
    }

    #[tokio::test]
    async fn fetch_thread_decodes_ok_and_error_bodies() {
        let (base, _) = spawn_forum_server().await;
        let api = ForumApi::new(format!("{base}/api/")).unwrap();

        let response = api.fetch_thread(1).await.unwrap();
        let thread = response.thread().unwrap();
        assert_eq!(thread.title, "First");
        assert_eq!(thread.replies.len(), 1);

        // 404 with an `ok: false` body is still a response, not a transport error.
        let response = api.fetch_thread(2).await.unwrap();
        assert_eq!(response, ThreadResponse::Err("Thread not found".into()));
    }

    #[tokio::test]
    async fn post_reply_sends_id_and_text() {
        let (base, state) = spawn_forum_server().await;
        let api = ForumApi::new(format!("{base}/api")).unwrap();

        assert_eq!(api.post_reply(9, "hello").await.unwrap(), PostResponse::Ok);
        assert_eq!(
            api.post_reply(9, "reject").await.unwrap(),
            PostResponse::Err("Rejected".into())
        );
        let posts = state.posts.lock().unwrap().clone();
        assert_eq!(posts[0], json!({"id": 9, "text": "hello"}));
    }

    #[tokio::test]
    async fn failed_post_prefers_server_message() {
        let (base, _) = spawn_forum_server().await;
        let api = ForumApi::new(format!("{base}/api")).unwrap();

        let err = api.post_reply(1, "explode").await.unwrap_err();
        assert_eq!(err.user_message(), "Bad input");

        let err = api.post_reply(1, "crash").await.unwrap_err();
        assert!(matches!(err, ApiError::Status { message: None, .. }));
        assert!(err.user_message().contains("500"));
    }

    #[tokio::test]
    async fn unreachable_server_is_a_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let api = ForumApi::new(format!("http://{addr}/api")).unwrap();
        let err = api.fetch_thread(1).await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
        assert!(!err.user_message().is_empty());
    }

    #[tokio::test]
    async fn archive_recovery_prefixes_thread_url() {
        let (base, _) = spawn_forum_server().await;
        let archive = Router::new().route(
            "/web/2/*rest",
            get(|Path(rest): Path<String>| async move {
                Json(json!({
                    "ok": true,
                    "thread": {
                        "title": rest,
                        "text": "", "hash": "op",
                        "created": "c", "modified": "m"
                    }
                }))
            }),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let archive_addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, archive).await;
        });

        let api = ForumApi::new(format!("{base}/api"))
            .unwrap()
            .with_archive_base(format!("http://{archive_addr}/web/2"));
        let response = api.recover_from_archive(4).await.unwrap();
        let title = &response.thread().unwrap().title;
        assert!(title.ends_with("/api/thread/4"), "{title}");
    }

    #[tokio::test]
    async fn worker_answers_each_command() {
        let (base, _) = spawn_forum_server().await;
        let api = ForumApi::new(format!("{base}/api")).unwrap();
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        tokio::spawn(run_worker(api, cmd_rx, event_tx));

        cmd_tx.send(ApiCommand::FetchThread { id: 1, seq: 7 }).unwrap();
        match event_rx.recv().await.unwrap() {
            ApiEvent::ThreadLoaded { seq, response } => {
                assert_eq!(seq, 7);
                assert!(response.thread().is_some());
            }
            other => panic!("unexpected event {other:?}"),
        }

        cmd_tx.send(ApiCommand::PostReply { id: 1, text: "hi".into() }).unwrap();
        assert!(matches!(
            event_rx.recv().await.unwrap(),
            ApiEvent::ReplyPosted(PostResponse::Ok)
        ));
    }
}
