use chrono::{DateTime, Duration, TimeZone, Utc};
use folio_schema::TokenResponse;
use std::fmt;

/// Refresh this long before the backend would reject the token.
const EXPIRY_MARGIN_SECS: i64 = 30;

/// An authenticated backend session.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub user: SessionUser,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: String,
    pub email: Option<String>,
}

impl Session {
    /// Builds a session from a token response received at `now`.
    pub fn from_token(token: TokenResponse, now: DateTime<Utc>) -> Self {
        let expires_at = token
            .expires_at
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
            .or_else(|| token.expires_in.map(|secs| now + Duration::seconds(secs)));
        let user = token.user.map_or_else(
            || SessionUser {
                id: String::new(),
                email: None,
            },
            |user| SessionUser {
                id: user.id,
                email: user.email,
            },
        );
        Self {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_at,
            user,
        }
    }

    /// True once the token is within the refresh margin of its expiry.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at
            .is_some_and(|at| at - Duration::seconds(EXPIRY_MARGIN_SECS) <= now)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("expires_at", &self.expires_at)
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(expires_in: Option<i64>, expires_at: Option<i64>) -> TokenResponse {
        serde_json::from_value(serde_json::json!({
            "access_token": "at-secret",
            "refresh_token": "rt-secret",
            "expires_in": expires_in,
            "expires_at": expires_at,
            "user": { "id": "u1", "email": "owner@example.com" }
        }))
        .expect("parse token")
    }

    #[test]
    fn expiry_prefers_absolute_timestamp() {
        let now = Utc.timestamp_opt(1_000, 0).single().expect("valid ts");
        let session = Session::from_token(token(Some(3600), Some(2_000)), now);
        assert_eq!(session.expires_at.map(|t| t.timestamp()), Some(2_000));
        assert_eq!(session.user.email.as_deref(), Some("owner@example.com"));
    }

    #[test]
    fn expiry_honours_margin() {
        let now = Utc.timestamp_opt(1_000, 0).single().expect("valid ts");
        let session = Session::from_token(token(Some(60), None), now);

        assert!(!session.is_expired_at(now));
        assert!(session.is_expired_at(now + Duration::seconds(31)));
    }

    #[test]
    fn sessions_without_expiry_never_expire() {
        let now = Utc::now();
        let session = Session::from_token(token(None, None), now);
        assert!(!session.is_expired_at(now + Duration::days(365)));
    }

    #[test]
    fn debug_hides_tokens() {
        let session = Session::from_token(token(Some(60), None), Utc::now());
        let printed = format!("{session:?}");
        assert!(!printed.contains("secret"));
    }
}
