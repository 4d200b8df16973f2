// ============================
// crates/backend-lib/src/auth/resolver.rs
// ============================
//! Per-request identity resolution.
//!
//! A request starts unauthenticated, is resolved by trying each configured
//! [`Authenticator`] in order, and ends either authenticated or rejected.
//! Rejections carry no reason: which stage failed is only logged.
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{
    header::{AUTHORIZATION, COOKIE},
    HeaderMap,
};
use metrics::counter;

use super::authenticator::{Authenticator, BasicAuthenticator, SessionAuthenticator};
use super::password::PasswordHasher;
use super::path_policy::PathPolicy;
use super::session::SessionStore;
use crate::config::{AuthMode, Settings};
use crate::metrics::{AUTH_AUTHENTICATED, AUTH_REJECTED};
use crate::storage::{User, UserLookup};

/// The parts of an HTTP request that authentication looks at
#[derive(Clone, Default)]
pub struct RequestContext {
    pub path: String,
    pub authorization: Option<String>,
    pub session_cookie: Option<String>,
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("path", &self.path)
            .field("has_authorization", &self.authorization.is_some())
            .field("has_session_cookie", &self.session_cookie.is_some())
            .finish()
    }
}

impl RequestContext {
    pub fn from_headers(path: &str, headers: &HeaderMap, cookie_name: &str) -> Self {
        Self {
            path: path.to_string(),
            authorization: headers
                .get(AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            session_cookie: cookie_value(headers, cookie_name),
        }
    }
}

/// Value of the cookie `name` across all `Cookie` headers
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"').to_string())
}

/// Terminal state of one resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Authenticated(User),
    Rejected,
}

impl AuthOutcome {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthOutcome::Authenticated(_))
    }

    pub fn into_user(self) -> Option<User> {
        match self {
            AuthOutcome::Authenticated(user) => Some(user),
            AuthOutcome::Rejected => None,
        }
    }
}

/// Path policy plus an ordered chain of authenticators
pub struct AuthResolver {
    policy: PathPolicy,
    chain: Vec<Arc<dyn Authenticator>>,
}

impl AuthResolver {
    pub fn new(policy: PathPolicy, chain: Vec<Arc<dyn Authenticator>>) -> Self {
        Self { policy, chain }
    }

    /// Build the chain selected by `settings.auth_mode`
    pub fn from_settings(
        settings: &Settings,
        sessions: SessionStore,
        users: Arc<dyn UserLookup>,
        hasher: PasswordHasher,
    ) -> Self {
        let policy = PathPolicy::new(settings.excluded_paths.iter().cloned());
        let session = || -> Arc<dyn Authenticator> {
            Arc::new(SessionAuthenticator::new(
                policy.clone(),
                sessions.clone(),
                users.clone(),
            ))
        };
        let basic = || -> Arc<dyn Authenticator> {
            Arc::new(BasicAuthenticator::new(policy.clone(), users.clone(), hasher))
        };

        let chain = match settings.auth_mode {
            AuthMode::Session => vec![session()],
            AuthMode::Basic => vec![basic()],
            AuthMode::SessionBasic => vec![session(), basic()],
        };
        Self::new(policy, chain)
    }

    pub fn requires_auth(&self, path: &str) -> bool {
        self.policy.requires_auth(path)
    }

    /// Try each authenticator in order; the first identity found wins
    pub async fn resolve(&self, request: &RequestContext) -> AuthOutcome {
        for authenticator in &self.chain {
            if let Some(user) = authenticator.current_user(request).await {
                counter!(AUTH_AUTHENTICATED).increment(1);
                return AuthOutcome::Authenticated(user);
            }
        }
        counter!(AUTH_REJECTED).increment(1);
        tracing::debug!(path = %request.path, "request rejected");
        AuthOutcome::Rejected
    }
}

#[async_trait]
impl Authenticator for AuthResolver {
    fn requires_auth(&self, path: &str) -> bool {
        AuthResolver::requires_auth(self, path)
    }

    async fn current_user(&self, request: &RequestContext) -> Option<User> {
        self.resolve(request).await.into_user()
    }
}
