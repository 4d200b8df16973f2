// ============================
// crates/backend-lib/src/config.rs
// ============================
//! Configuration management.
use std::net::SocketAddr;
use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Default configuration file, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "sessiongate.toml";

/// Prefix for environment overrides, e.g. `SESSIONGATE_BIND_ADDR`
pub const ENV_PREFIX: &str = "SESSIONGATE_";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Which authenticators the resolver consults, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    /// Session cookie only
    #[serde(alias = "session_auth")]
    Session,
    /// `Authorization: Basic` header only
    #[serde(alias = "basic_auth")]
    Basic,
    /// Session cookie first, then the Basic header
    SessionBasic,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// Log level, used when `RUST_LOG` is unset
    pub log_level: String,
    /// Emit JSON log lines instead of plain text
    pub log_json: bool,
    /// Name of the cookie carrying the session identifier
    pub session_cookie_name: String,
    /// Authenticator chain
    pub auth_mode: AuthMode,
    /// Paths reachable without authentication
    pub excluded_paths: Vec<String>,
    /// scrypt cost factor (log2 of N)
    pub scrypt_log_n: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            log_level: "info".to_string(),
            log_json: false,
            session_cookie_name: "_my_session_id".to_string(),
            auth_mode: AuthMode::Session,
            excluded_paths: vec![
                "/".to_string(),
                "/status/".to_string(),
                "/users/".to_string(),
                "/sessions/".to_string(),
                "/reset_password/".to_string(),
            ],
            scrypt_log_n: 15,
        }
    }
}

impl Settings {
    /// Load settings from `sessiongate.toml` and the environment
    pub fn load() -> Result<Self, AppError> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load settings from a specific TOML file and the environment.
    /// A missing file is not an error; defaults fill every gap.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let settings: Settings = Self::figment(path.as_ref()).extract()?;
        settings.validate()?;
        Ok(settings)
    }

    fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX))
            // legacy variable names
            .merge(
                Env::raw()
                    .only(&["SESSION_NAME"])
                    .map(|_| "session_cookie_name".into()),
            )
            .merge(Env::raw().only(&["AUTH_TYPE"]).map(|_| "auth_mode".into()))
    }

    /// Reject settings the service cannot run with
    pub fn validate(&self) -> Result<(), AppError> {
        let name = &self.session_cookie_name;
        if name.is_empty() {
            return Err(AppError::Config("session cookie name is empty".to_string()));
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        {
            return Err(AppError::Config(format!(
                "session cookie name {name:?} contains invalid characters"
            )));
        }

        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            return Err(AppError::Config(format!(
                "unknown log level {:?}",
                self.log_level
            )));
        }

        // scrypt requires 0 < log_n < 64; anything above 20 takes seconds per hash
        if !(1..=20).contains(&self.scrypt_log_n) {
            return Err(AppError::Config(format!(
                "scrypt_log_n must be between 1 and 20, got {}",
                self.scrypt_log_n
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.session_cookie_name, "_my_session_id");
        assert_eq!(settings.auth_mode, AuthMode::Session);
    }

    #[test]
    fn test_settings_validation() {
        let settings = Settings::default();

        let mut invalid = settings.clone();
        invalid.log_level = "loud".to_string();
        assert!(invalid.validate().is_err());

        let mut invalid = settings.clone();
        invalid.session_cookie_name = String::new();
        assert!(invalid.validate().is_err());

        let mut invalid = settings.clone();
        invalid.session_cookie_name = "bad name;".to_string();
        assert!(invalid.validate().is_err());

        let mut invalid = settings.clone();
        invalid.scrypt_log_n = 0;
        assert!(invalid.validate().is_err());

        let mut invalid = settings;
        invalid.scrypt_log_n = 30;
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_load_settings_file_and_env() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "custom.toml",
                r#"
                bind_addr = "0.0.0.0:8080"
                log_level = "debug"
                auth_mode = "session_basic"
                excluded_paths = ["/", "/health/"]
                "#,
            )?;
            jail.set_env("SESSIONGATE_LOG_LEVEL", "warn");

            let settings = Settings::load_from("custom.toml").expect("settings load");
            assert_eq!(settings.bind_addr.to_string(), "0.0.0.0:8080");
            // Environment variable takes precedence
            assert_eq!(settings.log_level, "warn");
            assert_eq!(settings.auth_mode, AuthMode::SessionBasic);
            assert_eq!(settings.excluded_paths, vec!["/", "/health/"]);
            // untouched keys keep their defaults
            assert_eq!(settings.scrypt_log_n, 15);
            Ok(())
        });
    }

    #[test]
    fn test_legacy_env_names() {
        Jail::expect_with(|jail| {
            jail.set_env("SESSION_NAME", "legacy_sid");
            jail.set_env("AUTH_TYPE", "basic_auth");

            let settings = Settings::load_from("missing.toml").expect("settings load");
            assert_eq!(settings.session_cookie_name, "legacy_sid");
            assert_eq!(settings.auth_mode, AuthMode::Basic);
            Ok(())
        });
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("bad.toml", r#"scrypt_log_n = 99"#)?;
            let err = Settings::load_from("bad.toml").unwrap_err();
            assert!(matches!(err, AppError::Config(_)));
            Ok(())
        });
    }
}
