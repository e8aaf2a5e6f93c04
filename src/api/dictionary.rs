use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::error::LookupError;
use crate::models::{ErrorResponse, FullLookupRequest, LookupRequest};
use crate::state::AppState;

/// POST /api/dictionary - Look up one section of a word.
pub async fn lookup_section(
    State(state): State<AppState>,
    body: Result<Json<LookupRequest>, JsonRejection>,
) -> Response {
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => return bad_body(rejection),
    };

    match state.service.lookup_section(&req).await {
        Ok(resp) => Json(resp).into_response(),
        Err(e) => error_response(headword(req.word.as_deref()), e),
    }
}

/// POST /api/dictionary/full - Discovery plus every section and sense in
/// one batch.
pub async fn lookup_word(
    State(state): State<AppState>,
    body: Result<Json<FullLookupRequest>, JsonRejection>,
) -> Response {
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => return bad_body(rejection),
    };

    match state.service.lookup_word(req.word.as_deref()).await {
        Ok(resp) => Json(resp).into_response(),
        Err(e) => error_response(headword(req.word.as_deref()), e),
    }
}

/// GET /api/dictionary/test - Liveness probe.
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub fn status_for(error: &LookupError) -> StatusCode {
    match error {
        LookupError::Validation(_) => StatusCode::BAD_REQUEST,
        LookupError::SourceUnavailable(_) => StatusCode::NOT_FOUND,
        LookupError::ModelTask(_) | LookupError::Aggregate(_) => StatusCode::BAD_GATEWAY,
        LookupError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(headword: Option<String>, error: LookupError) -> Response {
    let status = status_for(&error);
    if status.is_server_error() {
        tracing::warn!("Lookup failed ({status}): {error}");
    }
    (status, Json(ErrorResponse::new(headword, error.to_string()))).into_response()
}

fn bad_body(rejection: JsonRejection) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new(None, format!("Invalid request body: {}", rejection.body_text()))),
    )
        .into_response()
}

fn headword(word: Option<&str>) -> Option<String> {
    word.map(str::trim).filter(|w| !w.is_empty()).map(str::to_string)
}
