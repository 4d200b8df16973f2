// ==============
// crates/backend-lib/src/metrics.rs

//! Central place for metric keys
pub const SESSION_CREATED: &str = "session.created";
pub const SESSION_DESTROYED: &str = "session.destroyed";
pub const SESSION_ACTIVE: &str = "session.active";
pub const AUTH_AUTHENTICATED: &str = "auth.authenticated";
pub const AUTH_REJECTED: &str = "auth.rejected";
pub const USER_REGISTERED: &str = "user.registered";
pub const PASSWORD_RESET: &str = "user.password_reset";
