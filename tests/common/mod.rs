#![allow(dead_code)]

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

type RequestLog = Arc<Mutex<Vec<String>>>;

/// An in-process gateway serving canned answers on a random local port.
///
/// Questions containing "offline" fail with a JSON `detail`; questions
/// containing "crash" fail with a plain-text body.
pub struct FakeGateway {
    pub url: String,
    requests: RequestLog,
}

impl FakeGateway {
    pub fn start() -> Self {
        let requests: RequestLog = Arc::default();
        let log = requests.clone();
        let (tx, rx) = std::sync::mpsc::channel();

        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("failed to build runtime");
            rt.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("failed to bind");
                tx.send(listener.local_addr().expect("no local addr"))
                    .expect("failed to report address");
                axum::serve(listener, router(log))
                    .await
                    .expect("fake gateway stopped");
            });
        });

        let addr = rx.recv().expect("fake gateway did not start");
        Self {
            url: format!("http://{addr}"),
            requests,
        }
    }

    /// Requests seen so far, as "route body" strings.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("request log poisoned").clone()
    }

    /// Bodies of every request to a route.
    pub fn bodies(&self, route: &str) -> Vec<Value> {
        self.requests()
            .iter()
            .filter_map(|r| r.strip_prefix(route)?.strip_prefix(' '))
            .map(|body| serde_json::from_str(body).expect("recorded body is JSON"))
            .collect()
    }
}

fn router(log: RequestLog) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/explain", post(explain))
        .route("/preflight", post(preflight))
        .route("/index", post(index))
        .route("/change-digest", post(change_digest))
        .route("/onboard", post(onboard))
        .route("/snippet", get(snippet))
        .with_state(log)
}

fn record(log: &RequestLog, route: &str, body: &Value) {
    log.lock()
        .expect("request log poisoned")
        .push(format!("{route} {body}"));
}

async fn health() -> Json<Value> {
    Json(json!({"status": "ok", "qdrant_url": "http://qdrant:6333"}))
}

async fn explain(State(log): State<RequestLog>, Json(body): Json<Value>) -> Response {
    record(&log, "/explain", &body);
    let question = body["question"].as_str().unwrap_or_default();
    if question.contains("offline") {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"detail": "model offline"})),
        )
            .into_response();
    }
    if question.contains("crash") {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }
    Json(json!({
        "summary": "Run it with docker compose",
        "bullets": ["docker compose up"],
        "citations": [
            {"source": "repo", "file": "README.md", "start_line": 1, "end_line": 3},
            {"source": "repo", "file": "empty.py", "start_line": 5, "end_line": 6}
        ]
    }))
    .into_response()
}

async fn preflight(State(log): State<RequestLog>, Json(body): Json<Value>) -> Json<Value> {
    record(&log, "/preflight", &body);
    Json(json!({
        "path": body["path"],
        "summary": "1 ok, 1 warn",
        "checks": [
            {"name": "python", "status": "ok"},
            {"name": "docker", "status": "warn", "fix": "start the docker daemon"}
        ]
    }))
}

async fn index(State(log): State<RequestLog>, Json(body): Json<Value>) -> Json<Value> {
    record(&log, "/index", &body);
    Json(json!({"path": body["path"], "chunks_indexed": 12}))
}

async fn change_digest(State(log): State<RequestLog>, Json(body): Json<Value>) -> Json<Value> {
    record(&log, "/change-digest", &body);
    Json(json!({
        "path": body["path"],
        "since": "2024-01-01",
        "commit_count": 1,
        "top_files": [{"file": "auth.py", "count": 3}],
        "commits": [
            {"hash": "abc123", "date": "2024-01-02", "subject": "Add login", "files": ["auth.py"]}
        ]
    }))
}

async fn onboard(State(log): State<RequestLog>, Json(body): Json<Value>) -> Json<Value> {
    record(&log, "/onboard", &body);
    let chunks = if body["index"].as_bool().unwrap_or(false) {
        42
    } else {
        0
    };
    Json(json!({
        "path": body["path"],
        "chunks_indexed": chunks,
        "links": {"docs": "http://docs.local"},
        "next_steps": [{"name": "setup", "status": "done"}],
        "preflight": {"summary": "ok"}
    }))
}

async fn snippet(
    State(log): State<RequestLog>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    record(&log, "/snippet", &json!(params));
    match params.get("file").map(String::as_str) {
        Some("README.md") => "# Demo\nline two".into_response(),
        Some("empty.py") => String::new().into_response(),
        Some(file) if file.starts_with("src/") => "fn main() {}".into_response(),
        _ => (StatusCode::NOT_FOUND, Json(json!({"detail": "no such file"}))).into_response(),
    }
}

/// A throwaway RepoGuide home directory (config + preferences).
pub struct TestHome {
    pub dir: TempDir,
}

impl TestHome {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path to the compiled repoguide binary.
    pub fn repoguide_bin() -> std::path::PathBuf {
        std::path::PathBuf::from(env!("CARGO_BIN_EXE_repoguide"))
    }

    /// A command bound to this home and the given gateway URL, without colour.
    pub fn command(&self, gateway_url: &str) -> assert_cmd::Command {
        let mut cmd = assert_cmd::Command::new(Self::repoguide_bin());
        cmd.env("REPOGUIDE_HOME", self.path())
            .env("REPOGUIDE_API_BASE", gateway_url)
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG");
        cmd
    }
}
