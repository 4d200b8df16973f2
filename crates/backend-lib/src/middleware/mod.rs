// crates/backend-lib/src/middleware/mod.rs

//! Middleware for the `sessiongate` HTTP server.

pub mod require_auth;

pub use require_auth::{require_auth, CurrentUser};
