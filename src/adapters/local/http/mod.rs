//! HTTP inbound adapter: upload and stream endpoints.

mod error;
pub mod stream;
pub mod upload;

pub use error::ApiError;

use crate::application::UploadService;
use crate::clock::Clock;
use crate::domain::ExpiryTracker;
use axum::extract::DefaultBodyLimit;
use axum::http::header::{InvalidHeaderValue, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub uploads: Arc<UploadService>,
    pub tracker: ExpiryTracker,
    pub clock: Arc<dyn Clock>,
    pub hls_dir: Arc<PathBuf>,
}

/// Only `origin` may call us, with GET/POST/OPTIONS and a Content-Type header.
pub fn cors_layer(origin: &str) -> Result<CorsLayer, InvalidHeaderValue> {
    Ok(CorsLayer::new()
        .allow_origin(origin.parse::<HeaderValue>()?)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]))
}

pub fn router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/upload", post(upload::handle))
        .route("/stream/*path", get(stream::handle))
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
        .with_state(state)
}
