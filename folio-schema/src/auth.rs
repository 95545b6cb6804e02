//! Auth (GoTrue) token endpoint schema.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// `POST /auth/v1/token?grant_type=password` body.
#[derive(Clone, Serialize, Deserialize)]
pub struct PasswordGrant {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for PasswordGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordGrant")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// `POST /auth/v1/token?grant_type=refresh_token` body.
#[derive(Clone, Serialize, Deserialize)]
pub struct RefreshGrant {
    pub refresh_token: String,
}

impl fmt::Debug for RefreshGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshGrant")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Successful token endpoint response.
#[derive(Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,

    #[serde(default)]
    pub token_type: Option<String>,

    /// Lifetime in seconds.
    #[serde(default)]
    pub expires_in: Option<i64>,

    /// Absolute expiry as a unix timestamp (seconds).
    #[serde(default)]
    pub expires_at: Option<i64>,

    pub refresh_token: String,

    #[serde(default)]
    pub user: Option<AuthUser>,
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResponse")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("expires_at", &self.expires_at)
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,

    #[serde(default)]
    pub email: Option<String>,
}

/// Auth error body.
///
/// Older servers answer `{ "error", "error_description" }`, newer ones `{ "code", "error_code",
/// "msg" }`; both shapes land here.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct AuthErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AuthErrorBody {
    /// Most specific human-readable message the body carries.
    pub fn message(&self) -> Option<&str> {
        [
            &self.error_description,
            &self.msg,
            &self.message,
            &self.error,
        ]
        .into_iter()
        .find_map(|s| s.as_deref().filter(|s| !s.trim().is_empty()))
    }
}
