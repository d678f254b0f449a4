use axum::{extract::State, response::Response, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::extractors::AuthUser;
use crate::state::AppState;
use crate::utils::response::{created, empty_success, success};
use crate::utils::AppError;

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Serialize)]
struct SignUpPayload {
    email: String,
}

pub async fn sign_up(
    State(state): State<AppState>,
    Json(body): Json<SignUpRequest>,
) -> Result<Response, AppError> {
    state
        .auth
        .sign_up(&body.email, &body.password, &body.confirm_password)
        .await?;

    let payload = SignUpPayload {
        email: body.email.trim().to_lowercase(),
    };
    Ok(created(payload, "Check your email to confirm your account."))
}

pub async fn sign_in(
    State(state): State<AppState>,
    Json(body): Json<SignInRequest>,
) -> Result<Response, AppError> {
    let session = state.auth.sign_in(&body.email, &body.password).await?;
    info!(user_id = %session.user.id, "User signed in");
    Ok(success(session, "Signed in"))
}

pub async fn sign_out(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Response, AppError> {
    state.auth.sign_out(&auth.access_token).await?;
    state.chat_sessions.remove(&auth.user.id);
    state.engagement.forget_user(auth.user.id);
    info!(user_id = %auth.user.id, "User signed out");
    Ok(empty_success("Signed out"))
}

pub async fn password_reset(
    State(state): State<AppState>,
    Json(body): Json<PasswordResetRequest>,
) -> Result<Response, AppError> {
    state.auth.send_password_reset(&body.email).await?;
    Ok(empty_success("If that account exists, a reset link is on its way."))
}

pub async fn me(auth: AuthUser) -> Response {
    success(auth.user, "Current user")
}
