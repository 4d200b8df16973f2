// =============
// crates/backend-lib/src/auth/service.rs
// =============
//! Account operations behind the HTTP routes.
use async_trait::async_trait;

use crate::error::AppError;
use crate::storage::User;

#[async_trait]
pub trait AuthService: Send + Sync {
    /// Hash `password` and store a new user. `DuplicateRegistration` if the email is taken.
    async fn register_user(&self, email: &str, password: &str) -> Result<User, AppError>;

    /// Whether `password` matches the user registered under `email`
    async fn valid_login(&self, email: &str, password: &str) -> bool;

    /// New session for the user registered under `email`
    async fn create_session(&self, email: &str) -> Option<String>;

    async fn user_for_session(&self, session_id: &str) -> Option<User>;

    /// Returns whether the session existed
    async fn destroy_session(&self, session_id: &str) -> bool;

    /// Issue a reset token for `email`. `UnknownUser` if nobody has that email.
    async fn get_reset_password_token(&self, email: &str) -> Result<String, AppError>;

    /// Whether some user currently holds `reset_token`
    async fn valid_reset_token(&self, reset_token: &str) -> bool;

    /// Consume `reset_token` and set a new password. `InvalidResetToken` otherwise.
    async fn update_password(&self, reset_token: &str, new_password: &str) -> Result<(), AppError>;
}
