use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use crate::models::{AuthenticatedUser, Session};
use crate::services::AuthBackend;
use crate::utils::AppError;

/// `AuthBackend` over a GoTrue-compatible REST API (`<base>/auth/v1/...`).
pub struct GoTrueAuth {
    client: Client,
    base_url: String,
    api_key: String,
}

impl GoTrueAuth {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.client
            .post(format!("{}/auth/v1/{}", self.base_url, path))
            .header("apikey", &self.api_key)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, AppError> {
        let res = request.send().await.map_err(|e| {
            let msg = format!("Auth service connection error: {}", e);
            error!("{}", msg);
            AppError::ExternalServiceError(msg)
        })?;

        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }

        let body = res.json::<ErrorPayload>().await.unwrap_or_default();
        let detail = body.message();
        if status.is_client_error() {
            // Wrong credentials, duplicate account, expired token and the like
            Err(AppError::AuthError(
                detail.unwrap_or_else(|| "Authentication failed".to_string()),
            ))
        } else {
            let msg = format!("Auth service failed. Status: {}, Body: {:?}", status, detail);
            error!("{}", msg);
            Err(AppError::ExternalServiceError(msg))
        }
    }
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RecoverPayload<'a> {
    email: &'a str,
}

#[derive(Deserialize)]
struct UserPayload {
    id: Uuid,
    email: Option<String>,
}

#[derive(Deserialize)]
struct TokenPayload {
    access_token: String,
    refresh_token: String,
    expires_in: Option<i64>,
    user: UserPayload,
}

#[derive(Default, Deserialize)]
struct ErrorPayload {
    msg: Option<String>,
    message: Option<String>,
    error_description: Option<String>,
}

impl ErrorPayload {
    fn message(self) -> Option<String> {
        self.msg.or(self.message).or(self.error_description)
    }
}

impl From<UserPayload> for AuthenticatedUser {
    fn from(user: UserPayload) -> Self {
        Self {
            id: user.id,
            email: user.email,
        }
    }
}

#[async_trait]
impl AuthBackend for GoTrueAuth {
    async fn sign_up(&self, email: &str, password: &str) -> Result<(), AppError> {
        self.send(self.post("signup").json(&Credentials { email, password }))
            .await?;
        Ok(())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AppError> {
        let res = self
            .send(
                self.post("token")
                    .query(&[("grant_type", "password")])
                    .json(&Credentials { email, password }),
            )
            .await?;
        let token = res
            .json::<TokenPayload>()
            .await
            .map_err(|e| AppError::DecodeError(format!("Invalid token response: {}", e)))?;

        Ok(Session {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_in: token.expires_in,
            user: token.user.into(),
        })
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AppError> {
        self.send(self.post("logout").bearer_auth(access_token))
            .await?;
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), AppError> {
        self.send(self.post("recover").json(&RecoverPayload { email }))
            .await?;
        Ok(())
    }

    async fn user_for_token(&self, access_token: &str) -> Result<AuthenticatedUser, AppError> {
        let request = self
            .client
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token);
        let res = self.send(request).await?;
        let user = res
            .json::<UserPayload>()
            .await
            .map_err(|e| AppError::DecodeError(format!("Invalid user response: {}", e)))?;
        Ok(user.into())
    }
}
