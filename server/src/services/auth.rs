use std::sync::Arc;

use tracing::info;

use super::ports::AuthBackend;
use crate::models::{AuthenticatedUser, Session};
use crate::utils::AppError;

pub const MIN_PASSWORD_LEN: usize = 6;

/// Account operations. Input is validated here before anything is sent to the
/// auth provider.
pub struct AuthService {
    backend: Arc<dyn AuthBackend>,
    allowed_domain: String,
}

impl AuthService {
    pub fn new(backend: Arc<dyn AuthBackend>, allowed_domain: impl Into<String>) -> Self {
        Self {
            backend,
            allowed_domain: allowed_domain.into().trim_start_matches('@').to_lowercase(),
        }
    }

    pub fn allowed_domain(&self) -> &str {
        &self.allowed_domain
    }

    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<(), AppError> {
        let email = self.validate_sign_up(email, password, confirm_password)?;
        self.backend.sign_up(&email, password).await?;
        info!(email = %email, "Account created");
        Ok(())
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AppError> {
        let email = normalize_email(email)?;
        if password.is_empty() {
            return Err(AppError::ValidationError("Password is required.".to_string()));
        }
        self.backend.sign_in(&email, password).await
    }

    pub async fn sign_out(&self, access_token: &str) -> Result<(), AppError> {
        self.backend.sign_out(access_token).await
    }

    pub async fn send_password_reset(&self, email: &str) -> Result<(), AppError> {
        let email = normalize_email(email)?;
        self.backend.send_password_reset(&email).await?;
        info!(email = %email, "Password reset requested");
        Ok(())
    }

    pub async fn resolve_user(&self, access_token: &str) -> Result<AuthenticatedUser, AppError> {
        if access_token.is_empty() {
            return Err(AppError::AuthError("Missing access token".to_string()));
        }
        self.backend.user_for_token(access_token).await
    }

    /// Returns the normalized email on success.
    pub fn validate_sign_up(
        &self,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<String, AppError> {
        let email = normalize_email(email)?;
        if !email.ends_with(&format!("@{}", self.allowed_domain)) {
            return Err(AppError::ValidationError(format!(
                "You must use a @{} email address.",
                self.allowed_domain
            )));
        }
        if password != confirm_password {
            return Err(AppError::ValidationError("Passwords do not match.".to_string()));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::ValidationError(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters."
            )));
        }
        Ok(email)
    }
}

fn normalize_email(email: &str) -> Result<String, AppError> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(AppError::ValidationError("Enter a valid email address.".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    #[derive(Default)]
    struct CountingAuth {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl AuthBackend for CountingAuth {
        async fn sign_up(&self, _email: &str, _password: &str) -> Result<(), AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn sign_in(&self, email: &str, _password: &str) -> Result<Session, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Session {
                access_token: "access".into(),
                refresh_token: "refresh".into(),
                expires_in: Some(3600),
                user: AuthenticatedUser {
                    id: Uuid::new_v4(),
                    email: Some(email.to_string()),
                },
            })
        }

        async fn sign_out(&self, _access_token: &str) -> Result<(), AppError> {
            Ok(())
        }

        async fn send_password_reset(&self, _email: &str) -> Result<(), AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn user_for_token(&self, _access_token: &str) -> Result<AuthenticatedUser, AppError> {
            Err(AppError::AuthError("invalid".into()))
        }
    }

    fn service() -> (Arc<CountingAuth>, AuthService) {
        let backend = Arc::new(CountingAuth::default());
        (backend.clone(), AuthService::new(backend, "@Lion.LMU.edu"))
    }

    #[tokio::test]
    async fn test_sign_up_rejects_foreign_domain_before_network() {
        let (backend, auth) = service();
        let err = auth
            .sign_up("someone@gmail.com", "hunter22", "hunter22")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("@lion.lmu.edu"));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_sign_up_rejects_mismatched_passwords() {
        let (backend, auth) = service();
        let err = auth
            .sign_up("jdoe@lion.lmu.edu", "hunter22", "hunter23")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_sign_up_normalizes_and_forwards() {
        let (backend, auth) = service();
        auth.sign_up("  JDoe@Lion.LMU.edu ", "hunter22", "hunter22")
            .await
            .unwrap();
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_short_password_rejected() {
        let (_, auth) = service();
        assert!(auth.validate_sign_up("a@lion.lmu.edu", "abc", "abc").is_err());
    }

    #[test]
    fn test_lookalike_domain_rejected() {
        let (_, auth) = service();
        assert!(auth
            .validate_sign_up("a@evil-lion.lmu.edu", "hunter22", "hunter22")
            .is_err());
        assert!(auth
            .validate_sign_up("a@lion.lmu.edu.evil.com", "hunter22", "hunter22")
            .is_err());
    }

    #[tokio::test]
    async fn test_reset_requires_plausible_email() {
        let (backend, auth) = service();
        assert!(auth.send_password_reset("not-an-email").await.is_err());
        auth.send_password_reset("jdoe@lion.lmu.edu").await.unwrap();
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_token_is_rejected() {
        let (_, auth) = service();
        assert!(matches!(
            auth.resolve_user("").await,
            Err(AppError::AuthError(_))
        ));
    }
}
