use axum::{extract::State, response::Response, Json};
use chrono::Utc;
use serde::Deserialize;

use crate::extractors::AuthUser;
use crate::models::ChatMessage;
use crate::state::AppState;
use crate::utils::response::{empty_success, success};

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

pub async fn transcript(State(state): State<AppState>, auth: AuthUser) -> Response {
    let messages: Vec<ChatMessage> = state
        .chat_sessions
        .entry(auth.user.id)
        .or_default()
        .messages()
        .cloned()
        .collect();
    success(messages, "Chat transcript")
}

/// Blank messages are ignored and leave the transcript untouched.
pub async fn send_message(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<ChatRequest>,
) -> Response {
    let events = state.store.snapshot().await;
    let reply = state
        .chat_sessions
        .entry(auth.user.id)
        .or_default()
        .send(&state.chat, &body.message, &events, Utc::now());

    match reply {
        Some(reply) => success(reply, "Reply"),
        None => empty_success("Nothing to send"),
    }
}

pub async fn reset(State(state): State<AppState>, auth: AuthUser) -> Response {
    state.chat_sessions.remove(&auth.user.id);
    empty_success("Chat reset")
}
