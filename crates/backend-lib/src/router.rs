// ============================
// crates/backend-lib/src/router.rs
// ============================
//! Route table.
use std::sync::Arc;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::require_auth;
use crate::AppState;

/// Create the HTTP router.
///
/// Every route sits behind [`require_auth`]; the configured exclusion list
/// decides which of them are public.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::status))
        .route("/users", post(handlers::register))
        .route(
            "/sessions",
            post(handlers::login).delete(handlers::logout),
        )
        .route("/profile", get(handlers::profile))
        .route(
            "/reset_password",
            post(handlers::reset_password_token).put(handlers::update_password),
        )
        .layer(from_fn_with_state(state.clone(), require_auth))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
