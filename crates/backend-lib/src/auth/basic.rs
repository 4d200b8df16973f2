// ============================
// crates/backend-lib/src/auth/basic.rs
// ============================
//! `Authorization: Basic` credential extraction.
//!
//! Three stages, each short-circuiting on malformed input: strip the scheme
//! prefix, base64-decode to UTF-8, split at the first `:`. The `try_*`
//! variants report which stage failed; the public pipeline collapses every
//! failure to `None`.
use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use zeroize::Zeroize;

use crate::error::AuthError;

/// Scheme prefix, case-sensitive, exactly one trailing space
pub const BASIC_PREFIX: &str = "Basic ";

/// An identifier/secret pair decoded from a Basic header. Never persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub identifier: String,
    pub secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl Drop for Credentials {
    fn drop(&mut self) {
        self.secret.zeroize();
    }
}

pub fn try_extract_token(header: &str) -> Result<&str, AuthError> {
    header
        .strip_prefix(BASIC_PREFIX)
        .ok_or(AuthError::MalformedHeader)
}

pub fn try_decode_token(token: &str) -> Result<String, AuthError> {
    let bytes = STANDARD
        .decode(token)
        .map_err(|_| AuthError::InvalidBase64)?;
    String::from_utf8(bytes).map_err(|_| AuthError::InvalidBase64)
}

pub fn try_split_credentials(decoded: &str) -> Result<Credentials, AuthError> {
    let (identifier, secret) = decoded
        .split_once(':')
        .ok_or(AuthError::MissingSeparator)?;
    Ok(Credentials {
        identifier: identifier.to_string(),
        secret: secret.to_string(),
    })
}

/// Run the whole pipeline, reporting the first failing stage
pub fn try_extract_credentials(header: &str) -> Result<Credentials, AuthError> {
    let token = try_extract_token(header)?;
    let mut decoded = try_decode_token(token)?;
    let credentials = try_split_credentials(&decoded);
    decoded.zeroize();
    credentials
}

/// The part after `"Basic "`, or `None` for any other header value
pub fn extract_token(header: &str) -> Option<&str> {
    try_extract_token(header).ok()
}

/// Base64 → UTF-8, `None` on either failure
pub fn decode_token(token: &str) -> Option<String> {
    try_decode_token(token).ok()
}

/// Split at the first `:`; the secret keeps any later colons
pub fn split_credentials(decoded: &str) -> Option<Credentials> {
    try_split_credentials(decoded).ok()
}

/// Full pipeline over an optional header value
pub fn extract_credentials(header: Option<&str>) -> Option<Credentials> {
    header.and_then(|h| try_extract_credentials(h).ok())
}
