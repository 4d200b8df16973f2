// crates/backend-lib/src/middleware/require_auth.rs

//! Gate protected routes behind the [`AuthResolver`](crate::auth::AuthResolver).
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::{AuthOutcome, RequestContext};
use crate::error::AppError;
use crate::storage::User;
use crate::AppState;

/// Identity attached to requests that passed [`require_auth`]
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Excluded paths pass straight through; everything else needs an identity
/// or gets a 403.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = request.uri().path().to_string();
    if !state.resolver.requires_auth(&path) {
        return Ok(next.run(request).await);
    }

    let ctx = RequestContext::from_headers(
        &path,
        request.headers(),
        &state.settings.session_cookie_name,
    );
    match state.resolver.resolve(&ctx).await {
        AuthOutcome::Authenticated(user) => {
            request.extensions_mut().insert(CurrentUser(user));
            Ok(next.run(request).await)
        },
        AuthOutcome::Rejected => Err(AppError::Forbidden),
    }
}
