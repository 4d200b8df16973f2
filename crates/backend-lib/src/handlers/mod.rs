// crates/backend-lib/src/handlers/mod.rs

//! HTTP handlers.

pub mod account;

pub use account::{
    login, logout, profile, register, reset_password_token, status, update_password,
};
