//! GitHub contents API client against a stub server.
//!
//! The stub runs on its own tokio runtime; the blocking client is driven
//! from the test thread.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Value};
use tempfile::TempDir;

use campus_desk::cache::LocalCache;
use campus_desk::models::DocumentName;
use campus_desk::remote::github::GitHubStore;
use campus_desk::remote::{RemoteError, RemoteStore};
use campus_desk::retry::RetryPolicy;
use campus_desk::store::{DataStore, Origin, SaveError};

const TOKEN: &str = "test-token";
const REPO: &str = "office/desk-data";

#[derive(Default)]
struct StubState {
    files: HashMap<String, (Vec<u8>, String)>,
    revision: u64,
    gets: usize,
    puts: Vec<Value>,
    omit_inline: bool,
    rate_limited: bool,
}

type Shared = Arc<Mutex<StubState>>;

struct Stub {
    base: String,
    state: Shared,
    _runtime: tokio::runtime::Runtime,
}

impl Stub {
    fn start() -> Self {
        let state: Shared = Arc::default();
        let app = Router::new()
            .route(
                "/repos/{owner}/{repo}/contents/{*path}",
                get(get_contents).put(put_contents),
            )
            .with_state(state.clone());

        let runtime = tokio::runtime::Runtime::new().unwrap();
        let listener = runtime
            .block_on(tokio::net::TcpListener::bind("127.0.0.1:0"))
            .unwrap();
        let addr = listener.local_addr().unwrap();
        runtime.spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base: format!("http://{addr}"),
            state,
            _runtime: runtime,
        }
    }

    fn client(&self, token: &str) -> GitHubStore {
        GitHubStore::new(token, REPO, "main", &self.base, Duration::from_secs(5)).unwrap()
    }

    fn seed(&self, path: &str, content: &[u8]) {
        let mut s = self.state.lock().unwrap();
        s.revision += 1;
        let sha = format!("sha{}", s.revision);
        s.files.insert(path.to_string(), (content.to_vec(), sha));
    }

    fn with<R>(&self, f: impl FnOnce(&mut StubState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"))
}

fn wrap_base64(bytes: &[u8]) -> String {
    let encoded = STANDARD.encode(bytes);
    let lines: Vec<String> = encoded
        .as_bytes()
        .chunks(60)
        .map(|c| String::from_utf8_lossy(c).into_owned())
        .collect();
    lines.join("\n") + "\n"
}

async fn get_contents(
    State(state): State<Shared>,
    Path((_owner, _repo, path)): Path<(String, String, String)>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let mut s = state.lock().unwrap();
    s.gets += 1;
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"message": "Bad credentials"})))
            .into_response();
    }
    if s.rate_limited {
        return (
            StatusCode::FORBIDDEN,
            [("x-ratelimit-remaining", "0")],
            Json(json!({"message": "API rate limit exceeded"})),
        )
            .into_response();
    }
    assert_eq!(query.get("ref").map(String::as_str), Some("main"));

    let Some((content, sha)) = s.files.get(&path).cloned() else {
        return (StatusCode::NOT_FOUND, Json(json!({"message": "Not Found"}))).into_response();
    };

    let raw = headers
        .get("accept")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("raw"));
    if raw {
        return (StatusCode::OK, content).into_response();
    }

    let (encoding, inline) = if s.omit_inline {
        ("none", String::new())
    } else {
        ("base64", wrap_base64(&content))
    };
    Json(json!({
        "type": "file",
        "encoding": encoding,
        "path": path,
        "sha": sha,
        "content": inline,
    }))
    .into_response()
}

async fn put_contents(
    State(state): State<Shared>,
    Path((_owner, _repo, path)): Path<(String, String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut s = state.lock().unwrap();
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"message": "Bad credentials"})))
            .into_response();
    }
    s.puts.push(body.clone());

    let sent_sha = body.get("sha").and_then(Value::as_str).map(str::to_string);
    let current = s.files.get(&path).map(|(_, sha)| sha.clone());
    match (&current, &sent_sha) {
        (Some(cur), Some(sent)) if cur != sent => {
            return (StatusCode::CONFLICT, Json(json!({"message": "sha mismatch"})))
                .into_response()
        }
        (Some(_), None) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({"message": "\"sha\" wasn't supplied."})),
            )
                .into_response()
        }
        (None, Some(_)) => {
            return (StatusCode::NOT_FOUND, Json(json!({"message": "Not Found"}))).into_response()
        }
        _ => {}
    }

    let content = body
        .get("content")
        .and_then(Value::as_str)
        .and_then(|c| STANDARD.decode(c).ok())
        .unwrap_or_default();
    s.revision += 1;
    let sha = format!("sha{}", s.revision);
    s.files.insert(path, (content, sha.clone()));
    let status = if current.is_some() {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    (status, Json(json!({"content": {"sha": sha}}))).into_response()
}

#[test]
fn test_fetch_decodes_wrapped_base64() {
    let stub = Stub::start();
    let expertise = vec!["학사관리"; 10];
    let doc = json!([{"name": "김철수", "dept": "교학팀", "expertise": expertise}]);
    let bytes = serde_json::to_vec(&doc).unwrap();
    stub.seed("data/staff_profiles.json", &bytes);

    let file = stub.client(TOKEN).fetch("data/staff_profiles.json").unwrap();
    assert_eq!(file.content, bytes);
    assert_eq!(file.sha, "sha1");
}

#[test]
fn test_fetch_large_file_uses_raw_media_type() {
    let stub = Stub::start();
    stub.seed("data/weekly_reports.json", b"[1, 2, 3]");
    stub.with(|s| s.omit_inline = true);

    let file = stub.client(TOKEN).fetch("data/weekly_reports.json").unwrap();
    assert_eq!(file.content, b"[1, 2, 3]");
    assert_eq!(stub.with(|s| s.gets), 2);
}

#[test]
fn test_status_mapping() {
    let stub = Stub::start();
    stub.seed("data/schedules.json", b"[]");

    let missing = stub.client(TOKEN).fetch("data/nothing.json").unwrap_err();
    assert!(missing.is_not_found());

    let bad = stub.client("wrong").fetch("data/schedules.json").unwrap_err();
    assert!(matches!(bad, RemoteError::Unauthorized));

    stub.with(|s| s.rate_limited = true);
    let limited = stub.client(TOKEN).fetch("data/schedules.json").unwrap_err();
    assert!(matches!(limited, RemoteError::RateLimited(403)));
}

#[test]
fn test_update_with_stale_sha_is_conflict() {
    let stub = Stub::start();
    stub.seed("data/schedules.json", b"[]");
    let client = stub.client(TOKEN);

    let err = client
        .update("data/schedules.json", "Update schedules.json", b"[1]", "stale")
        .unwrap_err();
    assert!(matches!(err, RemoteError::Conflict(_)));
}

#[test]
fn test_store_creates_then_updates_over_http() {
    let stub = Stub::start();
    let tmp = TempDir::new().unwrap();
    let store = DataStore::new(
        Some(Box::new(stub.client(TOKEN))),
        LocalCache::new(tmp.path()),
        RetryPolicy::new(3, Duration::ZERO),
    );
    let name = DocumentName::new("business_cards").unwrap();
    let first = json!([{"name": "Jane Smith", "org": "UNESCO", "position": "Director"}]);
    let second = json!([]);

    store.save_document(&name, &first).unwrap();
    store.save_document(&name, &second).unwrap();

    let puts = stub.with(|s| s.puts.clone());
    assert_eq!(puts.len(), 2);
    assert_eq!(puts[0]["message"], "Create business_cards.json");
    assert_eq!(puts[0]["branch"], "main");
    assert!(puts[0].get("sha").is_none());
    assert_eq!(puts[1]["message"], "Update business_cards.json");
    assert_eq!(puts[1]["sha"], "sha1");

    let loaded = store.load_with_origin(&name).unwrap();
    assert_eq!(loaded.origin, Origin::Remote);
    assert_eq!(loaded.value, second);
    assert!(tmp.path().join("business_cards.json").exists());
}

#[test]
fn test_store_auth_failure_makes_one_request() {
    let stub = Stub::start();
    stub.seed("data/schedules.json", b"[]");
    let store = DataStore::new(
        Some(Box::new(stub.client("expired"))),
        LocalCache::new(TempDir::new().unwrap().path()),
        RetryPolicy::new(3, Duration::ZERO),
    );
    let name = DocumentName::new("schedules").unwrap();

    assert_eq!(store.load_document(&name), None);
    assert_eq!(stub.with(|s| s.gets), 1);

    let err = store.save_document(&name, &json!([])).unwrap_err();
    assert!(matches!(err, SaveError::Unauthorized { .. }));
    assert_eq!(stub.with(|s| s.gets), 2);
    assert!(stub.with(|s| s.puts.is_empty()));
}
