pub mod handlers;
pub mod verifier;

use std::any::Any;
use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::error;

use crate::protocol::{VerifyResponse, VERIFY_PATH};
pub use verifier::{VerificationOutcome, WalletVerifier};

#[derive(Clone, Default)]
pub struct AppState {
    pub verifier: Arc<WalletVerifier>,
}

impl AppState {
    pub fn new(verifier: WalletVerifier) -> Self {
        Self {
            verifier: Arc::new(verifier),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route(VERIFY_PATH, post(handlers::verify_wallet))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CatchPanicLayer::custom(handle_panic))
                .into_inner(),
        )
        .with_state(state)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    error!("Handler panicked: {}", detail);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(VerifyResponse::rejected("Internal server error.")),
    )
        .into_response()
}
