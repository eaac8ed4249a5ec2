//! In-process fake of the OMS backend for unit tests.

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    body::Bytes,
    extract::State,
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::{
    net::TcpListener,
    sync::{broadcast, oneshot},
};

use crate::{
    events::{ClientEvent, Collaborators, EventBus},
    OmsClient,
};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl RecordedRequest {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Default)]
struct FakeInner {
    collections: HashMap<String, Vec<Value>>,
    entities: HashMap<String, Value>,
    scripted: HashMap<(Method, String), (StatusCode, Value)>,
    holds: HashMap<String, VecDeque<oneshot::Receiver<()>>>,
    delays: HashMap<String, Duration>,
    requests: Vec<RecordedRequest>,
}

#[derive(Clone)]
pub(crate) struct FakeBackend {
    inner: Arc<Mutex<FakeInner>>,
    url: String,
}

impl FakeBackend {
    pub async fn spawn() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        let backend = Self {
            inner: Arc::new(Mutex::new(FakeInner::default())),
            url: format!("http://{addr}/api"),
        };
        let app = Router::new().fallback(handle).with_state(backend.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        backend
    }

    pub fn client(&self) -> OmsClient {
        OmsClient::connect(&self.url, Duration::from_secs(5)).expect("client")
    }

    pub fn seed_collection(&self, path: &str, items: Vec<Value>) {
        self.lock().collections.insert(path.to_string(), items);
    }

    pub fn seed_entity(&self, path: &str, entity: Value) {
        self.lock().entities.insert(path.to_string(), entity);
    }

    /// Every later `method path` request gets this answer.
    pub fn respond(&self, method: Method, path: &str, status: StatusCode, body: Value) {
        self.lock()
            .scripted
            .insert((method, path.to_string()), (status, body));
    }

    pub fn clear_responses(&self) {
        self.lock().scripted.clear();
    }

    /// The next request to `path` waits until the returned sender fires or
    /// is dropped.
    pub fn hold(&self, path: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.lock()
            .holds
            .entry(path.to_string())
            .or_default()
            .push_back(rx);
        tx
    }

    pub fn delay(&self, path: &str, delay: Duration) {
        self.lock().delays.insert(path.to_string(), delay);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    pub fn requests_to(&self, method: Method, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.method == method && request.path == path)
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeInner> {
        self.inner.lock().expect("fake backend lock")
    }
}

async fn handle(
    State(backend): State<FakeBackend>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    let path = uri
        .path()
        .strip_prefix("/api")
        .unwrap_or(uri.path())
        .to_string();
    let query: Vec<(String, String)> = url::form_urlencoded::parse(
        uri.query().unwrap_or_default().as_bytes(),
    )
    .into_owned()
    .collect();
    let body: Option<Value> = serde_json::from_slice(&body).ok();

    let (hold, delay) = {
        let mut inner = backend.lock();
        inner.requests.push(RecordedRequest {
            method: method.clone(),
            path: path.clone(),
            query: query.clone(),
            body: body.clone(),
        });
        let hold = inner
            .holds
            .get_mut(&path)
            .and_then(|queue| queue.pop_front());
        (hold, inner.delays.get(&path).copied())
    };
    if let Some(hold) = hold {
        let _ = hold.await;
    }
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let inner = backend.lock();
    if let Some((status, payload)) = inner.scripted.get(&(method.clone(), path.clone())) {
        return (*status, Json(payload.clone())).into_response();
    }

    if method == Method::GET {
        if let Some(items) = inner.collections.get(&path) {
            return Json(json!({ "data": page(items, &query) })).into_response();
        }
        if let Some(entity) = inner.entities.get(&path) {
            return Json(json!({ "data": entity })).into_response();
        }
        return (StatusCode::NOT_FOUND, Json(json!({ "message": "not found" }))).into_response();
    }
    if method == Method::DELETE {
        return StatusCode::NO_CONTENT.into_response();
    }

    let echoed = body
        .as_ref()
        .and_then(Value::as_object)
        .and_then(|object| object.values().next().cloned())
        .unwrap_or(Value::Null);
    Json(json!({ "data": echoed })).into_response()
}

fn page(items: &[Value], query: &[(String, String)]) -> Vec<Value> {
    let param = |key: &str| {
        query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    };
    let needle = param("query").unwrap_or_default().to_ascii_lowercase();
    let offset = param("offset").and_then(|v| v.parse().ok()).unwrap_or(0);
    let limit = param("limit")
        .and_then(|v| v.parse().ok())
        .unwrap_or(usize::MAX);

    items
        .iter()
        .filter(|item| needle.is_empty() || item.to_string().to_ascii_lowercase().contains(&needle))
        .skip(offset)
        .take(limit)
        .cloned()
        .collect()
}

/// Polls until `count` requests to `path` reached the backend.
pub(crate) async fn wait_for_requests(backend: &FakeBackend, path: &str, count: usize) {
    for _ in 0..500 {
        let seen = backend
            .requests()
            .iter()
            .filter(|request| request.path == path)
            .count();
        if seen >= count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("backend never saw {count} requests to {path}");
}

pub(crate) fn event_bus() -> (Collaborators, broadcast::Receiver<ClientEvent>) {
    let bus = EventBus::new();
    let events = bus.subscribe();
    (Collaborators::from_bus(bus), events)
}

pub(crate) fn drain(events: &mut broadcast::Receiver<ClientEvent>) -> Vec<ClientEvent> {
    let mut drained = Vec::new();
    while let Ok(event) = events.try_recv() {
        drained.push(event);
    }
    drained
}

pub(crate) fn body_json(id: i64, name: &str) -> Value {
    json!({ "id": id, "name": name })
}
