pub mod dictionary;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// All HTTP routes, with state attached.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/dictionary", post(dictionary::lookup_section))
        .route("/api/dictionary/full", post(dictionary::lookup_word))
        .route("/api/dictionary/test", get(dictionary::health))
        .with_state(state)
}
