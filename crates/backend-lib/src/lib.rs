// ============================
// crates/backend-lib/src/lib.rs
// ============================
//! Core library for the `sessiongate` authentication service: credential
//! parsing, password hashing, session tracking and the HTTP surface built on
//! top of them.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod router;
pub mod storage;
pub mod validation;

use std::sync::Arc;

use crate::auth::{AuthResolver, AuthService, DefaultAuth, PasswordHasher, SessionStore};
use crate::config::Settings;
use crate::error::AppError;
use crate::storage::{MemoryUserStore, UserStore};

pub use crate::router::create_router;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Account operations
    pub auth: Arc<dyn AuthService>,
    /// Live sessions
    pub sessions: SessionStore,
    /// Request identity resolution
    pub resolver: Arc<AuthResolver>,
    /// Settings the state was built from
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Create application state backed by an in-memory user store
    pub fn new(settings: Settings) -> Result<Self, AppError> {
        Self::with_store(Arc::new(MemoryUserStore::new()), settings)
    }

    /// Create application state over any user store
    pub fn with_store<U>(users: Arc<U>, settings: Settings) -> Result<Self, AppError>
    where
        U: UserStore + 'static,
    {
        settings.validate()?;
        let hasher = PasswordHasher::new(settings.scrypt_log_n)?;
        let sessions = SessionStore::new();

        let resolver = AuthResolver::from_settings(&settings, sessions.clone(), users.clone(), hasher);
        let auth = DefaultAuth::new(users, sessions.clone(), hasher);

        Ok(Self {
            auth: Arc::new(auth),
            sessions,
            resolver: Arc::new(resolver),
            settings: Arc::new(settings),
        })
    }

    /// Drop every live session
    pub fn shutdown(&self) {
        let live = self.sessions.len();
        self.sessions.clear();
        tracing::info!(live, "session store cleared");
    }
}
