use annotator_core::Session;
use annotator_gateway::{CompletionGateway, Credentials, GatewayConfig, ProviderId};
use axum::{extract::State, routing::post, Json, Router};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Nothing listens here, so any request fails at the transport layer
pub const DEAD_URL: &str = "http://127.0.0.1:1/v1";

/// Start a chat endpoint that answers "<model> answer"; returns base URL and hit counter
pub async fn spawn_echo_provider() -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));

    async fn chat(State(hits): State<Arc<AtomicUsize>>, Json(body): Json<Value>) -> Json<Value> {
        hits.fetch_add(1, Ordering::SeqCst);
        let model = body["model"].as_str().unwrap_or("unknown");
        Json(json!({
            "choices": [{"message": {"role": "assistant", "content": format!("{} answer", model)}}]
        }))
    }

    let app = Router::new()
        .route("/v1/chat/completions", post(chat))
        .with_state(hits.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/v1", addr), hits)
}

pub fn gateway(base_url: &str) -> CompletionGateway {
    CompletionGateway::new(GatewayConfig {
        groq_base_url: base_url.to_string(),
        openai_base_url: base_url.to_string(),
        ..GatewayConfig::default()
    })
    .unwrap()
}

pub fn session_with_keys(groq: Option<&str>, openai: Option<&str>) -> Session {
    let mut creds = Credentials::new();
    creds.set(ProviderId::Groq, groq.map(String::from));
    creds.set(ProviderId::OpenAi, openai.map(String::from));
    Session::new(creds)
}
