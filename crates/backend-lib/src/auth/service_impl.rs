// ============================
// crates/backend-lib/src/auth/service_impl.rs
// ============================
//! [`AuthService`] over a [`UserStore`] and the shared [`SessionStore`].
use std::sync::Arc;

use async_trait::async_trait;
use metrics::counter;
use tracing::{debug, info};

use super::password::PasswordHasher;
use super::session::SessionStore;
use super::token_generator::generate_secure_token;
use super::AuthService;
use crate::error::{AppError, AuthError};
use crate::metrics::{PASSWORD_RESET, USER_REGISTERED};
use crate::storage::{User, UserStore, UserUpdate};

pub struct DefaultAuth {
    users: Arc<dyn UserStore>,
    sessions: SessionStore,
    hasher: PasswordHasher,
}

impl DefaultAuth {
    pub fn new(users: Arc<dyn UserStore>, sessions: SessionStore, hasher: PasswordHasher) -> Self {
        Self {
            users,
            sessions,
            hasher,
        }
    }

    async fn user_by_email(&self, email: &str) -> Result<User, AuthError> {
        self.users.find_user_by(&[("email", email)]).await
    }
}

#[async_trait]
impl AuthService for DefaultAuth {
    async fn register_user(&self, email: &str, password: &str) -> Result<User, AppError> {
        // cheap check first so duplicates don't pay for a hash
        if self.user_by_email(email).await.is_ok() {
            return Err(AuthError::DuplicateRegistration(email.to_string()).into());
        }

        let hashed = self.hasher.hash_blocking(password.to_string()).await?;
        let user = self.users.add_user(email, hashed).await?;

        counter!(USER_REGISTERED).increment(1);
        info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    async fn valid_login(&self, email: &str, password: &str) -> bool {
        let Ok(user) = self.user_by_email(email).await else {
            return self.hasher.reject_blocking(password.to_string()).await;
        };
        self.hasher
            .verify_blocking(user.hashed_password, password.to_string())
            .await
    }

    async fn create_session(&self, email: &str) -> Option<String> {
        let user = self.user_by_email(email).await.ok()?;
        self.sessions.create(&user.id)
    }

    async fn user_for_session(&self, session_id: &str) -> Option<User> {
        let user_id = self.sessions.lookup(session_id)?;
        self.users.find_by_id(&user_id).await.ok().flatten()
    }

    async fn destroy_session(&self, session_id: &str) -> bool {
        self.sessions.destroy(session_id)
    }

    async fn get_reset_password_token(&self, email: &str) -> Result<String, AppError> {
        let user = self.user_by_email(email).await?;
        let token = generate_secure_token();
        self.users
            .update_user(
                &user.id,
                UserUpdate {
                    reset_token: Some(Some(token.clone())),
                    ..Default::default()
                },
            )
            .await?;

        debug!(user_id = %user.id, "reset token issued");
        Ok(token)
    }

    async fn valid_reset_token(&self, reset_token: &str) -> bool {
        !reset_token.is_empty()
            && self
                .users
                .find_user_by(&[("reset_token", reset_token)])
                .await
                .is_ok()
    }

    async fn update_password(&self, reset_token: &str, new_password: &str) -> Result<(), AppError> {
        // hash before taking the token so the swap below is a single store step
        let hashed = self.hasher.hash_blocking(new_password.to_string()).await?;
        let user = self.users.consume_reset_token(reset_token, hashed).await?;

        counter!(PASSWORD_RESET).increment(1);
        info!(user_id = %user.id, "password updated");
        Ok(())
    }
}
