use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    AuthenticatedUser, Coordinate, Event, EventDraft, Session, UserEventAction, VoteAction,
};
use crate::utils::AppError;

/// Event rows and per-user action records in the hosted database.
#[async_trait]
pub trait EventBackend: Send + Sync {
    /// All events, date ascending.
    async fn fetch_events(&self) -> Result<Vec<Event>, AppError>;
    async fn fetch_user_action(
        &self,
        user_id: Uuid,
        event_id: Uuid,
    ) -> Result<Option<UserEventAction>, AppError>;
    async fn create_event(&self, draft: &EventDraft) -> Result<Event, AppError>;
    async fn set_attendance(
        &self,
        user_id: Uuid,
        event_id: Uuid,
        attending: bool,
    ) -> Result<(), AppError>;
    async fn set_vote(&self, user_id: Uuid, event_id: Uuid, vote: VoteAction)
        -> Result<(), AppError>;
}

/// Account management in the hosted auth service.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str) -> Result<(), AppError>;
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AppError>;
    async fn sign_out(&self, access_token: &str) -> Result<(), AppError>;
    async fn send_password_reset(&self, email: &str) -> Result<(), AppError>;
    async fn user_for_token(&self, access_token: &str) -> Result<AuthenticatedUser, AppError>;
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// `Ok(None)` when the address resolves to nothing.
    async fn geocode(&self, address: &str) -> Result<Option<Coordinate>, AppError>;
}
