//! Browser surface: one page with the three annotation forms

mod handlers;
mod render;

use annotator_core::Session;
use annotator_gateway::CompletionGateway;
use annotator_store::RecordStore;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

/// Largest accepted image upload
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Session and store, only ever touched by one interaction at a time
pub struct Workspace {
    pub session: Session,
    pub store: RecordStore,
}

/// State shared across handlers
#[derive(Clone)]
pub struct AppState {
    workspace: Arc<Mutex<Workspace>>,
    gateway: Arc<CompletionGateway>,
}

impl AppState {
    pub fn new(session: Session, store: RecordStore, gateway: CompletionGateway) -> Self {
        Self {
            workspace: Arc::new(Mutex::new(Workspace { session, store })),
            gateway: Arc::new(gateway),
        }
    }
}

/// Build the router with all form endpoints
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/credentials", post(handlers::update_credentials))
        .route("/comparison/generate", post(handlers::generate_comparison))
        .route("/comparison/save", post(handlers::save_comparison))
        .route("/hallucination/save", post(handlers::save_hallucination))
        .route(
            "/image/upload",
            post(handlers::upload_image).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/image/save", post(handlers::save_image))
        .route("/image", get(handlers::uploaded_image))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
