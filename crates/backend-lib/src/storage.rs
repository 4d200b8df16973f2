// ============================
// crates/backend-lib/src/storage.rs
// ============================
//! User record storage.
use std::fmt;

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::auth::HashedPassword;
use crate::error::AuthError;

/// Columns accepted by [`UserStore::find_user_by`]
pub const USER_FIELDS: [&str; 4] = ["id", "email", "hashed_password", "reset_token"];

/// A registered user
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub email: String,
    pub hashed_password: HashedPassword,
    pub reset_token: Option<String>,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("has_reset_token", &self.reset_token.is_some())
            .finish_non_exhaustive()
    }
}

impl User {
    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "id" => Some(&self.id),
            "email" => Some(&self.email),
            "hashed_password" => Some(self.hashed_password.as_str()),
            "reset_token" => self.reset_token.as_deref(),
            _ => None,
        }
    }
}

/// Changes applied by [`UserStore::update_user`]; `None` leaves a column as is
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub hashed_password: Option<HashedPassword>,
    pub reset_token: Option<Option<String>>,
}

/// Read-only view of the user store used by the authentication core
#[async_trait]
pub trait UserLookup: Send + Sync {
    /// User with the given id, if any
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AuthError>;

    /// Every user with the given email, in insertion order
    async fn search_by_email(&self, email: &str) -> Result<Vec<User>, AuthError>;
}

/// Trait for user storage backends
#[async_trait]
pub trait UserStore: UserLookup {
    /// Add a user. Fails with `DuplicateRegistration` if the email is taken.
    async fn add_user(
        &self,
        email: &str,
        hashed_password: HashedPassword,
    ) -> Result<User, AuthError>;

    /// First user matching every `(column, value)` filter
    async fn find_user_by(&self, filters: &[(&str, &str)]) -> Result<User, AuthError>;

    /// Apply `update` to the user with id `user_id`
    async fn update_user(&self, user_id: &str, update: UserUpdate) -> Result<User, AuthError>;

    /// Swap in `hashed_password` for the holder of `reset_token` and clear the
    /// token, as one step. `InvalidResetToken` if no user holds it.
    async fn consume_reset_token(
        &self,
        reset_token: &str,
        hashed_password: HashedPassword,
    ) -> Result<User, AuthError>;
}

/// In-memory implementation of the [`UserStore`] trait
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: RwLock<Vec<User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.read().is_empty()
    }
}

#[async_trait]
impl UserLookup for MemoryUserStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AuthError> {
        Ok(self.users.read().iter().find(|u| u.id == id).cloned())
    }

    async fn search_by_email(&self, email: &str) -> Result<Vec<User>, AuthError> {
        Ok(self
            .users
            .read()
            .iter()
            .filter(|u| u.email == email)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn add_user(
        &self,
        email: &str,
        hashed_password: HashedPassword,
    ) -> Result<User, AuthError> {
        let mut users = self.users.write();
        if users.iter().any(|u| u.email == email) {
            return Err(AuthError::DuplicateRegistration(email.to_string()));
        }

        let user = User {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            hashed_password,
            reset_token: None,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by(&self, filters: &[(&str, &str)]) -> Result<User, AuthError> {
        if filters.is_empty() {
            return Err(AuthError::InvalidFilterField("<empty>".to_string()));
        }
        if let Some((field, _)) = filters.iter().find(|(f, _)| !USER_FIELDS.contains(f)) {
            return Err(AuthError::InvalidFilterField((*field).to_string()));
        }

        self.users
            .read()
            .iter()
            .find(|user| {
                filters
                    .iter()
                    .all(|(field, value)| user.field(field) == Some(*value))
            })
            .cloned()
            .ok_or(AuthError::UnknownUser)
    }

    async fn update_user(&self, user_id: &str, update: UserUpdate) -> Result<User, AuthError> {
        let mut users = self.users.write();
        let user = users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or(AuthError::UnknownUser)?;

        if let Some(hashed_password) = update.hashed_password {
            user.hashed_password = hashed_password;
        }
        if let Some(reset_token) = update.reset_token {
            user.reset_token = reset_token;
        }
        Ok(user.clone())
    }

    async fn consume_reset_token(
        &self,
        reset_token: &str,
        hashed_password: HashedPassword,
    ) -> Result<User, AuthError> {
        if reset_token.is_empty() {
            return Err(AuthError::InvalidResetToken);
        }
        let mut users = self.users.write();
        let user = users
            .iter_mut()
            .find(|u| u.reset_token.as_deref() == Some(reset_token))
            .ok_or(AuthError::InvalidResetToken)?;

        user.hashed_password = hashed_password;
        user.reset_token = None;
        Ok(user.clone())
    }
}
