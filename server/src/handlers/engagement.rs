use axum::{
    extract::{Path, State},
    response::Response,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::extractors::AuthUser;
use crate::models::VoteAction;
use crate::services::Reconciliation;
use crate::state::AppState;
use crate::utils::response::success;
use crate::utils::AppError;

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub action: VoteAction,
}

#[derive(Debug, Deserialize)]
pub struct RsvpRequest {
    pub attending: bool,
}

pub async fn vote(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(event_id): Path<Uuid>,
    Json(body): Json<VoteRequest>,
) -> Result<Response, AppError> {
    let outcome = state
        .engagement
        .vote(auth.user.id, event_id, body.action)
        .await?;
    respond(outcome, "Vote saved")
}

pub async fn rsvp(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(event_id): Path<Uuid>,
    Json(body): Json<RsvpRequest>,
) -> Result<Response, AppError> {
    let outcome = state
        .engagement
        .set_attendance(auth.user.id, event_id, body.attending)
        .await?;
    let message = if body.attending {
        "You're going"
    } else {
        "RSVP removed"
    };
    respond(outcome, message)
}

/// A rolled-back mutation is an error for the caller, carrying the restored state.
fn respond(outcome: Reconciliation, message: &str) -> Result<Response, AppError> {
    match outcome {
        Reconciliation::Confirmed { state } => Ok(success(state, message)),
        Reconciliation::RolledBack { state, reason } => {
            tracing::debug!(reason = %reason, "Reporting rollback to client");
            let state = serde_json::to_value(state)
                .map_err(|e| AppError::InternalServerError(e.to_string()))?;
            Err(AppError::RolledBack {
                message: "Couldn't save your change. It has been undone.".to_string(),
                state,
            })
        }
    }
}
