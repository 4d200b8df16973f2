// ================
// crates/common/src/lib.rs
// ================
//! Wire types shared by the `sessiongate` HTTP surface and its clients.
//! Requests are form-encoded, responses are JSON.

use serde::{Deserialize, Serialize};

/// `POST /users` body
#[derive(Serialize, Deserialize, Clone)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
}

/// `POST /sessions` body
#[derive(Serialize, Deserialize, Clone)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// `POST /reset_password` body
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ResetTokenForm {
    pub email: String,
}

/// `PUT /reset_password` body
#[derive(Serialize, Deserialize, Clone)]
pub struct UpdatePasswordForm {
    pub email: String,
    pub reset_token: String,
    pub new_password: String,
}

/// Generic `{"message": ...}` payload, used by `GET /`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

/// Payload returned by account operations that echo the email back
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AccountResponse {
    pub email: String,
    pub message: String,
}

/// `GET /profile` payload
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProfileResponse {
    pub email: String,
}

/// `POST /reset_password` payload
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ResetTokenResponse {
    pub email: String,
    pub reset_token: String,
}

// Forms carry passwords; keep them out of logs.
macro_rules! redacted_debug {
    ($ty:ident { $($field:ident),* }) => {
        impl std::fmt::Debug for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_struct(stringify!($ty))
                    $(.field(stringify!($field), &self.$field))*
                    .finish_non_exhaustive()
            }
        }
    };
}

redacted_debug!(RegisterForm { email });
redacted_debug!(LoginForm { email });
redacted_debug!(UpdatePasswordForm { email });

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forms_hide_secrets_in_debug() {
        let form = UpdatePasswordForm {
            email: "bob@example.com".to_string(),
            reset_token: "tok-123".to_string(),
            new_password: "hunter2".to_string(),
        };
        let printed = format!("{form:?}");
        assert!(printed.contains("bob@example.com"));
        assert!(!printed.contains("tok-123"));
        assert!(!printed.contains("hunter2"));

        let login = LoginForm {
            email: "bob@example.com".to_string(),
            password: "hunter2".to_string(),
        };
        assert!(!format!("{login:?}").contains("hunter2"));
    }

    #[test]
    fn test_response_json_shape() {
        let body = serde_json::to_value(ResetTokenResponse {
            email: "bob@example.com".to_string(),
            reset_token: "abc".to_string(),
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"email": "bob@example.com", "reset_token": "abc"})
        );
    }
}
