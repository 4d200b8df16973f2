// ============================
// crates/backend-lib/src/auth/mod.rs
// ============================
//! Authentication module.

pub mod authenticator;
pub mod basic;
pub mod password;
pub mod path_policy;
pub mod resolver;
pub mod session;
pub mod token_generator;
mod service;
mod service_impl;

pub use authenticator::{Authenticator, BasicAuthenticator, SessionAuthenticator};
pub use basic::{extract_credentials, Credentials};
pub use password::{HashedPassword, PasswordHasher};
pub use path_policy::PathPolicy;
pub use resolver::{AuthOutcome, AuthResolver, RequestContext};
pub use service::AuthService;
pub use service_impl::DefaultAuth;
pub use session::{Session, SessionStore};
