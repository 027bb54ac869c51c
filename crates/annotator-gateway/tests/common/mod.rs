use axum::{extract::State, http::HeaderMap, http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// What the stub answers to every chat request
#[derive(Clone)]
pub enum StubReply {
    Text(String),
    Status(u16, Value),
    Raw(Value),
}

#[derive(Clone)]
pub struct CapturedRequest {
    pub authorization: Option<String>,
    pub body: Value,
}

/// Local OpenAI-compatible endpoint recording what it receives
#[derive(Clone)]
pub struct StubProvider {
    pub base_url: String,
    hits: Arc<AtomicUsize>,
    last: Arc<Mutex<Option<CapturedRequest>>>,
}

impl StubProvider {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<CapturedRequest> {
        self.last.lock().unwrap().clone()
    }
}

#[derive(Clone)]
struct StubState {
    reply: StubReply,
    hits: Arc<AtomicUsize>,
    last: Arc<Mutex<Option<CapturedRequest>>>,
}

async fn chat(
    State(state): State<StubState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.hits.fetch_add(1, Ordering::SeqCst);
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    *state.last.lock().unwrap() = Some(CapturedRequest {
        authorization,
        body,
    });

    match state.reply {
        StubReply::Text(text) => (
            StatusCode::OK,
            Json(json!({
                "id": "chatcmpl-stub",
                "object": "chat.completion",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": text},
                    "finish_reason": "stop"
                }]
            })),
        ),
        StubReply::Status(code, body) => (StatusCode::from_u16(code).unwrap(), Json(body)),
        StubReply::Raw(body) => (StatusCode::OK, Json(body)),
    }
}

pub async fn spawn_stub(reply: StubReply) -> StubProvider {
    let hits = Arc::new(AtomicUsize::new(0));
    let last = Arc::new(Mutex::new(None));
    let state = StubState {
        reply,
        hits: hits.clone(),
        last: last.clone(),
    };

    let app = Router::new()
        .route("/v1/chat/completions", post(chat))
        .with_state(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    StubProvider {
        base_url: format!("http://{}/v1", addr),
        hits,
        last,
    }
}
