use crate::api::Backend;
use crate::error::{AppError, Result};
use crate::logger;
use crate::models::{PendingSignup, User};
use crate::storage::LocalStore;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Default)]
pub struct AuthState {
    pub user: Option<User>,
    pub pending: Option<PendingSignup>,
    pub loading: bool,
}

/// Result of a sign-in attempt. Sign-in never fails with an error; a
/// rejected attempt carries the reason in `message`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthOutcome {
    pub success: bool,
    pub message: String,
}

/// The signed-in user and any half-finished registration. Clones share the
/// same state.
#[derive(Clone)]
pub struct AuthSession {
    backend: Arc<dyn Backend>,
    state: Arc<RwLock<AuthState>>,
    store: LocalStore,
}

impl AuthSession {
    pub fn new(backend: Arc<dyn Backend>, store: LocalStore) -> Self {
        Self {
            backend,
            state: Arc::new(RwLock::new(AuthState {
                loading: true,
                ..AuthState::default()
            })),
            store,
        }
    }

    pub async fn user(&self) -> Option<User> {
        self.state.read().await.user.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.user.is_some()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    pub async fn has_pending_signup(&self) -> bool {
        self.state.read().await.pending.is_some()
    }

    pub async fn pending_email(&self) -> Option<String> {
        self.state
            .read()
            .await
            .pending
            .as_ref()
            .map(|p| p.email.clone())
    }

    /// Restore a user from the session cookie, if there is one.
    pub async fn check_session(&self) -> Option<User> {
        let user = match self.backend.verify().await {
            Ok(raw) => Some(User::from(raw)),
            Err(e) => {
                logger::log(&format!("No existing session found: {}", e));
                None
            }
        };
        let mut state = self.state.write().await;
        state.user = user.clone();
        state.loading = false;
        user
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> AuthOutcome {
        match self.backend.sign_in(email, password).await {
            Ok(raw) => {
                let user = User::from(raw);
                logger::log(&format!("Signed in as {}", user.email));
                self.state.write().await.user = Some(user);
                AuthOutcome {
                    success: true,
                    message: "Sign in successful".to_string(),
                }
            }
            Err(e) => {
                logger::warn(&format!("Sign in failed: {}", e));
                let message = match &e {
                    AppError::Http { message, .. } | AppError::Application(message)
                        if !message.is_empty() =>
                    {
                        message.clone()
                    }
                    AppError::Network(_) => e.user_message(),
                    _ => "Sign in failed".to_string(),
                };
                AuthOutcome {
                    success: false,
                    message,
                }
            }
        }
    }

    /// First step of registration: asks the backend to email an OTP and
    /// remembers the details for verification.
    pub async fn sign_up(&self, name: &str, email: &str, password: &str) -> Result<String> {
        let message = self.backend.sign_up(name, email, password).await?;
        self.state.write().await.pending = Some(PendingSignup {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        });
        if message.is_empty() {
            Ok("OTP sent to your email".to_string())
        } else {
            Ok(message)
        }
    }

    pub async fn verify_sign_up(&self, otp: &str) -> Result<String> {
        let pending = self
            .state
            .read()
            .await
            .pending
            .clone()
            .ok_or(AppError::NoPendingSignup)?;

        let user = self.backend.verify_sign_up(&pending.email, otp).await?;

        let mut state = self.state.write().await;
        if let Some(raw) = user {
            state.user = Some(User::from(raw));
        }
        state.pending = None;
        Ok("Account created successfully".to_string())
    }

    pub async fn resend_otp(&self) -> Result<String> {
        let pending = self
            .state
            .read()
            .await
            .pending
            .clone()
            .ok_or(AppError::NoPendingSignup)?;
        self.sign_up(&pending.name, &pending.email, &pending.password)
            .await
    }

    /// Always ends signed out, whatever the backend says.
    pub async fn sign_out(&self) {
        if let Err(e) = self.backend.sign_out().await {
            logger::error(&format!("Sign out error: {}", e));
        }

        {
            let mut state = self.state.write().await;
            state.user = None;
            state.pending = None;
        }

        if let Err(e) = self.store.clear_all() {
            logger::warn(&format!("Failed to clear local storage: {}", e));
        }
    }

    pub async fn forgot_password(&self, email: &str) -> Result<String> {
        let message = self.backend.forgot_password(email).await?;
        if message.is_empty() {
            Ok("Password reset code sent to your email".to_string())
        } else {
            Ok(message)
        }
    }

    pub async fn reset_password(&self, email: &str, otp: &str, new_password: &str) -> Result<String> {
        let message = self.backend.reset_password(email, otp, new_password).await?;
        if message.is_empty() {
            Ok("Password reset successfully".to_string())
        } else {
            Ok(message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{raw_user, MockBackend};

    fn session(backend: MockBackend) -> (AuthSession, Arc<MockBackend>, LocalStore) {
        let backend = Arc::new(backend);
        let store = LocalStore::in_memory();
        (
            AuthSession::new(backend.clone(), store.clone()),
            backend,
            store,
        )
    }

    #[tokio::test]
    async fn test_check_session_restores_user() {
        let (auth, _, _) =
            session(MockBackend::new().with_session(raw_user("Ada Lovelace", "ada@example.com")));
        assert!(auth.is_loading().await);

        let user = auth.check_session().await.unwrap();
        assert_eq!(user.avatar, "https://api.dicebear.com/7.x/initials/svg?seed=Ada Lovelace");
        assert!(!auth.is_loading().await);
        assert!(auth.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_check_session_without_cookie() {
        let (auth, _, _) = session(MockBackend::new());
        assert!(auth.check_session().await.is_none());
        assert!(!auth.is_loading().await);
        assert!(!auth.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_sign_in_outcomes() {
        let (auth, _, _) = session(MockBackend::new());
        let rejected = auth.sign_in("sam@example.com", "wrong").await;
        assert!(!rejected.success);
        assert_eq!(rejected.message, "Invalid credentials");
        assert!(!auth.is_authenticated().await);

        let accepted = auth.sign_in("sam@example.com", "Secret123").await;
        assert!(accepted.success);
        assert_eq!(accepted.message, "Sign in successful");
        assert_eq!(
            auth.user().await.map(|u| u.email),
            Some("sam@example.com".to_string())
        );
    }

    #[tokio::test]
    async fn test_verify_without_sign_up_fails() {
        let (auth, backend, _) = session(MockBackend::new());
        let err = auth.verify_sign_up("123456").await.unwrap_err();
        assert!(matches!(err, AppError::NoPendingSignup));
        assert_eq!(
            err.to_string(),
            "No pending signup found. Please request OTP first."
        );
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_sign_up_then_verify() {
        let (auth, backend, _) = session(MockBackend::new());
        auth.sign_up("Sam", "sam@example.com", "Secret123").await.unwrap();
        assert_eq!(auth.pending_email().await.as_deref(), Some("sam@example.com"));

        assert!(auth.verify_sign_up("000000").await.is_err());
        assert!(auth.has_pending_signup().await);

        let message = auth.verify_sign_up("123456").await.unwrap();
        assert_eq!(message, "Account created successfully");
        assert!(!auth.has_pending_signup().await);
        assert!(auth.is_authenticated().await);
        assert_eq!(backend.call_count("verify_sign_up"), 2);
    }

    #[tokio::test]
    async fn test_failed_sign_up_keeps_nothing_pending() {
        let (auth, _, _) = session(MockBackend::new().failing("sign_up"));
        assert!(auth.sign_up("Sam", "sam@example.com", "Secret123").await.is_err());
        assert!(!auth.has_pending_signup().await);
    }

    #[tokio::test]
    async fn test_resend_otp_reuses_pending_details() {
        let (auth, backend, _) = session(MockBackend::new());
        assert!(matches!(auth.resend_otp().await, Err(AppError::NoPendingSignup)));
        auth.sign_up("Sam", "sam@example.com", "Secret123").await.unwrap();
        auth.resend_otp().await.unwrap();
        assert_eq!(backend.call_count("sign_up"), 2);
    }

    #[tokio::test]
    async fn test_sign_out_clears_even_when_backend_fails() {
        let (auth, backend, store) = session(MockBackend::new().failing("sign_out"));
        auth.sign_in("sam@example.com", "Secret123").await;
        auth.sign_up("Sam", "sam@example.com", "Secret123").await.unwrap();
        store.set("stunotes-ui-theme", "light").unwrap();
        store.session_set("draft", "x");

        auth.sign_out().await;

        assert_eq!(backend.call_count("sign_out"), 1);
        assert!(!auth.is_authenticated().await);
        assert!(!auth.has_pending_signup().await);
        assert_eq!(store.get("stunotes-ui-theme"), None);
        assert_eq!(store.session_get("draft"), None);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let (auth, _, _) = session(MockBackend::new());
        let other = auth.clone();
        other.sign_in("sam@example.com", "Secret123").await;
        assert!(auth.is_authenticated().await);
    }
}
