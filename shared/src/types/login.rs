use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::user::User;

// ---------------------------------------------------------------------------
// Login wire types
// ---------------------------------------------------------------------------

/// Body of `POST /auth/login`.
#[derive(Clone, Serialize, Deserialize)]
pub struct LoginData {
    pub email: String,
    pub password: String,
}

impl LoginData {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

// Keeps the password out of logs.
impl fmt::Debug for LoginData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginData")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// The one canonical shape of a successful login.
#[derive(Clone, PartialEq)]
pub struct LoginGrant {
    pub token: String,
    pub user: User,
}

impl fmt::Debug for LoginGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginGrant")
            .field("token", &"<redacted>")
            .field("user", &self.user)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoginShapeError {
    #[error("login response carries no token")]
    MissingToken,

    #[error("login response carries no user")]
    MissingUser,

    #[error("login response user is invalid: {0}")]
    InvalidUser(String),
}

impl LoginShapeError {
    pub fn to_code(&self) -> &'static str {
        match self {
            Self::MissingToken => "MISSING_TOKEN",
            Self::MissingUser => "MISSING_USER",
            Self::InvalidUser(_) => "INVALID_USER",
        }
    }
}

/// Reduce every login response shape the backend has produced to a
/// [`LoginGrant`].
///
/// Accepted shapes, checked in this order:
///   1. `{ "data": { "token": .., "usuario" | "user": .. } }`
///   2. `{ "token": .., "usuario" | "user": .. }`
///
/// A nested token wins over a flat one. The token must be a non-empty string.
pub fn normalize_login_response(body: &Value) -> Result<LoginGrant, LoginShapeError> {
    let envelope = match body.get("data") {
        Some(data) if token_of(data).is_some() => data,
        _ => body,
    };

    let token = token_of(envelope).ok_or(LoginShapeError::MissingToken)?;

    let user = ["usuario", "user"]
        .iter()
        .filter_map(|key| envelope.get(*key))
        .find(|v| !v.is_null())
        .ok_or(LoginShapeError::MissingUser)?;

    let user: User = serde_json::from_value(user.clone())
        .map_err(|e| LoginShapeError::InvalidUser(e.to_string()))?;

    Ok(LoginGrant {
        token: token.to_string(),
        user,
    })
}

fn token_of(value: &Value) -> Option<&str> {
    value
        .get("token")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
}
