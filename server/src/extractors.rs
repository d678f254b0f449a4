use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::models::AuthenticatedUser;
use crate::state::AppState;
use crate::utils::AppError;

/// The caller behind the request's `Authorization: Bearer` token.
pub struct AuthUser {
    pub user: AuthenticatedUser,
    pub access_token: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let access_token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AppError::AuthError("Missing bearer token".to_string()))?
            .to_string();

        let user = state.auth.resolve_user(&access_token).await?;
        tracing::Span::current().record("user_id", tracing::field::display(user.id));

        Ok(Self { user, access_token })
    }
}
