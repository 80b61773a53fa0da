use axum::{
    body::Bytes,
    extract::State,
    response::{IntoResponse, Json, Response},
};
use tracing::warn;

use super::AppState;
use crate::error::VerificationError;
use crate::protocol::VerifyRequest;

/// `POST /api/verify-wallets`
///
/// The body is parsed here rather than through the `Json` extractor so every
/// failure, including an unreadable body, is answered with a JSON
/// `{ valid: false, error }` payload.
pub async fn verify_wallet(State(state): State<AppState>, body: Bytes) -> Response {
    let request: VerifyRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            let err = VerificationError::from(e);
            warn!("Unparseable verification request: {}", err);
            return err.into_response();
        }
    };

    let outcome = state.verifier.verify(&request);
    (outcome.status, Json(outcome.body)).into_response()
}

pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "wallet-verify",
        "timestamp": chrono::Utc::now()
    }))
}
