//! Router, handlers and the mapping from store errors to HTTP responses.

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Path, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use envelope_vault::ErrorKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use vault_store::{StoreError, Vault};

use crate::rate_limit::{rate_limit_middleware, RateLimiter};

// ---------------------------------------------------------------------------
// App state
// ---------------------------------------------------------------------------

pub struct AppState {
    pub vault: Vault,
    pub rate_limiter: RateLimiter,
}

pub type Shared = Arc<AppState>;

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct CreateRecordReq {
    #[serde(default, alias = "partyId")]
    party_id: Option<String>,
    #[serde(default)]
    payload: Option<Value>,
}

#[derive(Serialize)]
struct DecryptResponse {
    payload: Value,
}

#[derive(Serialize, Clone)]
pub struct ApiError {
    pub error: String,
}

const MISSING_FIELDS: &str = "party_id and payload are required";
const DECRYPTION_FAILED: &str = "decryption failed";

fn err(msg: impl Into<String>) -> (StatusCode, Json<ApiError>) {
    (StatusCode::BAD_REQUEST, Json(ApiError { error: msg.into() }))
}

fn err404() -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::NOT_FOUND,
        Json(ApiError {
            error: "record not found".into(),
        }),
    )
}

fn err500() -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiError {
            error: "internal error".into(),
        }),
    )
}

/// Format and integrity failures share one message so a caller cannot tell
/// which check rejected the record.
fn store_error_response(e: &StoreError) -> Response {
    match e {
        StoreError::RecordNotFound(_) => err404().into_response(),
        StoreError::InvalidRequest(_) => err(MISSING_FIELDS).into_response(),
        StoreError::Envelope(inner) if matches!(inner.kind(), ErrorKind::Format | ErrorKind::Integrity) => {
            err(DECRYPTION_FAILED).into_response()
        }
        other => {
            tracing::error!(error = %other, "request failed");
            err500().into_response()
        }
    }
}

// ---------------------------------------------------------------------------
// Routes
// ---------------------------------------------------------------------------

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

async fn create_record(
    State(state): State<Shared>,
    body: Result<Json<CreateRecordReq>, JsonRejection>,
) -> Response {
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            return (
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(ApiError {
                    error: "request body too large".into(),
                }),
            )
                .into_response();
        }
        Err(_) => return err(MISSING_FIELDS).into_response(),
    };

    let (party_id, payload) = match (req.party_id, req.payload) {
        (Some(p), Some(v)) if !p.trim().is_empty() => (p, v),
        _ => return err(MISSING_FIELDS).into_response(),
    };

    match state.vault.create(&party_id, &payload) {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(e) => store_error_response(&e),
    }
}

async fn get_record(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    match state.vault.get(&id) {
        Ok(record) => Json(record).into_response(),
        Err(e) => store_error_response(&e),
    }
}

async fn decrypt_record(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    match state.vault.decrypt::<Value>(&id) {
        Ok(payload) => Json(DecryptResponse { payload }).into_response(),
        Err(e) => store_error_response(&e),
    }
}

async fn list_party_records(
    State(state): State<Shared>,
    Path(party_id): Path<String>,
) -> Response {
    match state.vault.list_by_party(&party_id) {
        Ok(records) => Json(records).into_response(),
        Err(e) => store_error_response(&e),
    }
}

pub fn app(state: Shared, max_body_bytes: usize) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/records", post(create_record))
        .route("/api/records/:id", get(get_record))
        .route("/api/records/:id/decrypt", post(decrypt_record))
        .route("/api/parties/:party_id/records", get(list_party_records))
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit_middleware))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
