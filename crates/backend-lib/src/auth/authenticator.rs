// ============================
// crates/backend-lib/src/auth/authenticator.rs
// ============================
//! Authenticator capability and its two concrete variants.
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::basic::{try_extract_credentials, Credentials};
use super::password::PasswordHasher;
use super::path_policy::PathPolicy;
use super::resolver::RequestContext;
use super::session::SessionStore;
use crate::error::AuthError;
use crate::storage::{User, UserLookup};

/// Something that can tell who is making a request
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Whether `path` needs an identity at all
    fn requires_auth(&self, path: &str) -> bool;

    /// The requesting user, or `None` if this authenticator cannot vouch for one
    async fn current_user(&self, request: &RequestContext) -> Option<User>;
}

/// Resolves the session cookie through the [`SessionStore`]
pub struct SessionAuthenticator {
    policy: PathPolicy,
    sessions: SessionStore,
    users: Arc<dyn UserLookup>,
}

impl SessionAuthenticator {
    pub fn new(policy: PathPolicy, sessions: SessionStore, users: Arc<dyn UserLookup>) -> Self {
        Self {
            policy,
            sessions,
            users,
        }
    }

    pub async fn try_current_user(&self, request: &RequestContext) -> Result<User, AuthError> {
        let session_id = request
            .session_cookie
            .as_deref()
            .ok_or(AuthError::SessionNotFound)?;
        let user_id = self
            .sessions
            .lookup(session_id)
            .ok_or(AuthError::SessionNotFound)?;
        self.users
            .find_by_id(&user_id)
            .await?
            .ok_or(AuthError::UnknownUser)
    }
}

#[async_trait]
impl Authenticator for SessionAuthenticator {
    fn requires_auth(&self, path: &str) -> bool {
        self.policy.requires_auth(path)
    }

    async fn current_user(&self, request: &RequestContext) -> Option<User> {
        match self.try_current_user(request).await {
            Ok(user) => Some(user),
            Err(reason) => {
                debug!(%reason, "session authentication failed");
                None
            },
        }
    }
}

/// Checks `Authorization: Basic` credentials against stored password hashes
pub struct BasicAuthenticator {
    policy: PathPolicy,
    users: Arc<dyn UserLookup>,
    hasher: PasswordHasher,
}

impl BasicAuthenticator {
    pub fn new(policy: PathPolicy, users: Arc<dyn UserLookup>, hasher: PasswordHasher) -> Self {
        Self {
            policy,
            users,
            hasher,
        }
    }

    /// Match credentials against the users registered under `identifier`.
    ///
    /// Only the first candidate is checked; a mismatch there rejects even if
    /// a later candidate would have matched.
    pub async fn user_from_credentials(&self, credentials: &Credentials) -> Result<User, AuthError> {
        let candidates = self.users.search_by_email(&credentials.identifier).await?;
        let Some(first) = candidates.into_iter().next() else {
            self.hasher.reject_blocking(credentials.secret.clone()).await;
            return Err(AuthError::UnknownUser);
        };

        let matched = self
            .hasher
            .verify_blocking(first.hashed_password.clone(), credentials.secret.clone())
            .await;
        if matched {
            Ok(first)
        } else {
            Err(AuthError::WrongPassword)
        }
    }

    pub async fn try_current_user(&self, request: &RequestContext) -> Result<User, AuthError> {
        let header = request
            .authorization
            .as_deref()
            .ok_or(AuthError::MalformedHeader)?;
        let credentials = try_extract_credentials(header)?;
        self.user_from_credentials(&credentials).await
    }
}

#[async_trait]
impl Authenticator for BasicAuthenticator {
    fn requires_auth(&self, path: &str) -> bool {
        self.policy.requires_auth(path)
    }

    async fn current_user(&self, request: &RequestContext) -> Option<User> {
        match self.try_current_user(request).await {
            Ok(user) => Some(user),
            Err(reason) => {
                debug!(%reason, "basic authentication failed");
                None
            },
        }
    }
}
