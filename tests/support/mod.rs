//! Shared test harness: an in-process backend serving canned RPC
//! responses on an ephemeral port, with call recording for assertions.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, Uri},
    response::IntoResponse,
};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use url::Url;

use larder::api::Backend;
use larder::cache::Stores;
use larder::infra::storage::SessionStorage;
use larder::rpc::RpcClient;

/// One canned RPC response.
#[derive(Clone, Debug)]
pub struct Canned {
    pub status: u16,
    pub body: Value,
    pub delay: Option<Duration>,
}

impl Canned {
    pub fn ok(body: Value) -> Self {
        Self {
            status: 200,
            body,
            delay: None,
        }
    }

    pub fn error(status: u16, body: Value) -> Self {
        Self {
            status,
            body,
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[derive(Debug)]
pub struct RecordedCall {
    pub path: String,
    pub authorization: Option<String>,
    pub body: Value,
}

struct Inner {
    responses: Mutex<HashMap<String, Canned>>,
    calls: Mutex<Vec<RecordedCall>>,
}

/// Canned backend bound to an ephemeral local port.
#[derive(Clone)]
pub struct CannedBackend {
    inner: Arc<Inner>,
    pub base: Url,
}

impl CannedBackend {
    pub async fn start(responses: HashMap<String, Canned>) -> Self {
        let inner = Arc::new(Inner {
            responses: Mutex::new(responses),
            calls: Mutex::new(Vec::new()),
        });
        let app = Router::new()
            .fallback(handle)
            .with_state(Arc::clone(&inner));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test backend");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve test backend");
        });

        Self {
            inner,
            base: Url::parse(&format!("http://{addr}/")).expect("base url"),
        }
    }

    /// Replace (or install) the canned response for a path.
    pub fn set(&self, path: &str, canned: Canned) {
        self.inner
            .responses
            .lock()
            .expect("responses lock")
            .insert(path.to_owned(), canned);
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.inner
            .calls
            .lock()
            .expect("calls lock")
            .iter()
            .filter(|call| call.path == path)
            .count()
    }

    pub fn last_authorization(&self, path: &str) -> Option<String> {
        self.inner
            .calls
            .lock()
            .expect("calls lock")
            .iter()
            .rev()
            .find(|call| call.path == path)
            .and_then(|call| call.authorization.clone())
    }

    pub fn last_body(&self, path: &str) -> Option<Value> {
        self.inner
            .calls
            .lock()
            .expect("calls lock")
            .iter()
            .rev()
            .find(|call| call.path == path)
            .map(|call| call.body.clone())
    }
}

async fn handle(
    State(inner): State<Arc<Inner>>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let path = uri.path().to_owned();
    let parsed: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let authorization = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    inner.calls.lock().expect("calls lock").push(RecordedCall {
        path: path.clone(),
        authorization,
        body: parsed,
    });

    let canned = inner
        .responses
        .lock()
        .expect("responses lock")
        .get(&path)
        .cloned();
    match canned {
        Some(canned) => {
            if let Some(delay) = canned.delay {
                tokio::time::sleep(delay).await;
            }
            let status = StatusCode::from_u16(canned.status).expect("canned status");
            (status, Json(canned.body)).into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("no canned response for {path}") })),
        )
            .into_response(),
    }
}

/// Serve an arbitrary router on an ephemeral port; returns its base URL.
pub async fn serve(app: Router) -> Url {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test server");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve test server");
    });
    Url::parse(&format!("http://{addr}/")).expect("base url")
}

/// The full store set wired against a test backend, with in-memory
/// storage.
pub fn build_stores(base: &Url) -> (Stores, Arc<Backend>, Arc<SessionStorage>) {
    let storage = Arc::new(SessionStorage::in_memory());
    let rpc = RpcClient::new(base.clone(), Duration::from_secs(5), Arc::clone(&storage))
        .expect("rpc client");
    let backend = Backend::new(Arc::new(rpc));
    let stores = Stores::new(Arc::clone(&backend), Arc::clone(&storage));
    (stores, backend, storage)
}
