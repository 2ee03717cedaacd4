//! HTTP front end for the classifier.
//!
//! The fitted pipeline is loaded once and shared read-only through [`AppState`].

mod error;
mod handlers;
mod scoring;

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use log::info;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::classifier::Classifier;

pub use error::ApiError;
pub use handlers::{
    CategorizeRequest, InfoResponse, ParseRequest, PredictRequest, PredictResponse, MAX_MERCHANT_CHARS,
    MAX_TEXT_CHARS,
};
pub use scoring::{categorize, Categorization, ScoringMode, LEGACY_ALTERNATIVES, MAX_ALTERNATIVES};

/// Everything a request handler needs.
#[derive(Debug, Clone)]
pub struct AppState {
    pub classifier: Arc<Classifier>,
    pub scoring: ScoringMode,
    pub model_path: PathBuf,
}

impl AppState {
    pub fn new(classifier: Classifier, scoring: ScoringMode, model_path: impl Into<PathBuf>) -> Self {
        Self {
            classifier: Arc::new(classifier),
            scoring,
            model_path: model_path.into(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(handlers::root_handler))
        .route("/info", get(handlers::info_handler))
        .route("/categorize", post(handlers::categorize_handler))
        .route("/predict", post(handlers::predict_handler))
        .route("/parse", post(handlers::parse_handler))
        .layer(cors)
        .with_state(Arc::new(state))
}

/// Binds `addr` and serves until the process is stopped.
pub async fn serve(addr: SocketAddr, state: AppState) -> io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await
}
