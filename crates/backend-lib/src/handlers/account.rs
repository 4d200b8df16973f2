// ============================
// crates/backend-lib/src/handlers/account.rs
// ============================
//! Account, session and password-reset handlers.
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap, HeaderValue},
    response::{IntoResponse, Redirect, Response},
    Extension, Form, Json,
};
use sessiongate_common::{
    AccountResponse, LoginForm, MessageResponse, ProfileResponse, RegisterForm,
    ResetTokenForm, ResetTokenResponse, UpdatePasswordForm,
};
use tracing::{info, warn};

use crate::auth::resolver::cookie_value;
use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::validation::{validate_email, validate_password};
use crate::AppState;

fn session_cookie(name: &str, session_id: &str) -> Result<HeaderValue, AppError> {
    HeaderValue::from_str(&format!("{name}={session_id}; Path=/; HttpOnly; SameSite=Lax"))
        .map_err(|e| AppError::Internal(format!("invalid session cookie: {e}")))
}

fn clear_session_cookie(name: &str) -> Result<HeaderValue, AppError> {
    HeaderValue::from_str(&format!("{name}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0"))
        .map_err(|e| AppError::Internal(format!("invalid session cookie: {e}")))
}

/// `GET /`
pub async fn status() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Bienvenue".to_string(),
    })
}

/// `POST /users`
pub async fn register(
    State(state): State<Arc<AppState>>,
    Form(form): Form<RegisterForm>,
) -> Result<Json<AccountResponse>, AppError> {
    validate_email(&form.email)?;
    validate_password(&form.password)?;

    let user = state.auth.register_user(&form.email, &form.password).await?;
    Ok(Json(AccountResponse {
        email: user.email,
        message: "user created".to_string(),
    }))
}

/// `POST /sessions`
pub async fn login(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    if !state.auth.valid_login(&form.email, &form.password).await {
        warn!("login rejected");
        return Err(AppError::InvalidCredentials);
    }
    let session_id = state
        .auth
        .create_session(&form.email)
        .await
        .ok_or(AppError::InvalidCredentials)?;

    let mut headers = HeaderMap::new();
    headers.insert(
        SET_COOKIE,
        session_cookie(&state.settings.session_cookie_name, &session_id)?,
    );
    let body = AccountResponse {
        email: form.email,
        message: "logged in".to_string(),
    };
    Ok((headers, Json(body)).into_response())
}

/// `DELETE /sessions`
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let cookie_name = &state.settings.session_cookie_name;
    let session_id = cookie_value(&headers, cookie_name).ok_or(AppError::Forbidden)?;
    if !state.auth.destroy_session(&session_id).await {
        return Err(AppError::Forbidden);
    }

    info!("session destroyed");
    let mut response_headers = HeaderMap::new();
    response_headers.insert(SET_COOKIE, clear_session_cookie(cookie_name)?);
    Ok((response_headers, Redirect::to("/")).into_response())
}

/// `GET /profile`, behind [`require_auth`](crate::middleware::require_auth)
pub async fn profile(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<ProfileResponse> {
    Json(ProfileResponse { email: user.email })
}

/// `POST /reset_password`
pub async fn reset_password_token(
    State(state): State<Arc<AppState>>,
    Form(form): Form<ResetTokenForm>,
) -> Result<Json<ResetTokenResponse>, AppError> {
    let reset_token = state
        .auth
        .get_reset_password_token(&form.email)
        .await
        .map_err(forbid_auth_failures)?;
    Ok(Json(ResetTokenResponse {
        email: form.email,
        reset_token,
    }))
}

/// `PUT /reset_password`
pub async fn update_password(
    State(state): State<Arc<AppState>>,
    Form(form): Form<UpdatePasswordForm>,
) -> Result<Json<AccountResponse>, AppError> {
    if !state.auth.valid_reset_token(&form.reset_token).await {
        return Err(AppError::Forbidden);
    }
    validate_password(&form.new_password)?;
    state
        .auth
        .update_password(&form.reset_token, &form.new_password)
        .await
        .map_err(forbid_auth_failures)?;
    Ok(Json(AccountResponse {
        email: form.email,
        message: "Password updated".to_string(),
    }))
}

// Unknown emails and bad tokens are both plain 403s on the reset routes.
fn forbid_auth_failures(err: AppError) -> AppError {
    match err {
        AppError::Auth(_) => AppError::Forbidden,
        other => other,
    }
}
