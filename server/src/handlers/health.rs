use axum::{extract::State, response::Response};
use serde::Serialize;

use crate::state::AppState;
use crate::utils::response::success;

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
    events_loaded: usize,
    generation: u64,
}

pub async fn health_check(State(state): State<AppState>) -> Response {
    let payload = HealthPayload {
        status: "ok",
        service: "plot-api",
        events_loaded: state.store.snapshot().await.len(),
        generation: state.store.generation(),
    };

    success(payload, "Health check successful")
}
