//! Data types for the Taskhub Gateway
//!
//! Defines structures for the OAuth exchange, token refresh, and the opaque
//! payloads the proxy relays between browser and upstream.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// OAuth providers the gateway can broker logins for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Google,
    Kakao,
}

impl Provider {
    /// Parse the provider segment of a route path (case-insensitive)
    pub fn from_path(segment: &str) -> Option<Self> {
        match segment.to_ascii_lowercase().as_str() {
            "google" => Some(Provider::Google),
            "kakao" => Some(Provider::Kakao),
            _ => None,
        }
    }

    /// Provider name as the upstream API spells it in its sign-in path
    pub fn upstream_name(self) -> &'static str {
        match self {
            Provider::Google => "GOOGLE",
            Provider::Kakao => "KAKAO",
        }
    }

    /// The provider's authorization endpoint
    pub fn authorize_endpoint(self) -> &'static str {
        match self {
            Provider::Google => "https://accounts.google.com/o/oauth2/v2/auth",
            Provider::Kakao => "https://kauth.kakao.com/oauth/authorize",
        }
    }

    /// Scope to request, where the provider needs one
    pub fn scope(self) -> Option<&'static str> {
        match self {
            Provider::Google => Some("openid email profile"),
            Provider::Kakao => None,
        }
    }

    /// The pre-registered callback URI on this gateway's origin
    pub fn redirect_uri(self, base_url: &str) -> String {
        format!("{}/oauth/{}", base_url.trim_end_matches('/'), self)
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Google => write!(f, "google"),
            Provider::Kakao => write!(f, "kakao"),
        }
    }
}

/// Result of exchanging an authorization code at the upstream API
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthExchangeResult {
    pub access_token: String,
    pub refresh_token: String,
    pub user: AuthUser,
}

/// User record returned alongside the token pair
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: u64,
    pub email: String,
    pub nickname: String,
    pub image: Option<String>,
    pub team_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Response from the upstream token refresh endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResult {
    pub access_token: String,
}

/// Query parameters the OAuth provider sends to the callback route
#[derive(Debug, Deserialize)]
pub struct OAuthCallbackParams {
    pub code: Option<String>,
    pub error: Option<String>,
}

/// Opaque upstream response payload relayed to the browser.
///
/// The upstream's error bodies have no fixed shape; this union keeps the
/// proxy's output contract explicit instead of an untyped passthrough.
#[derive(Debug, Clone)]
pub enum UpstreamBody {
    Json(Value),
    Text(String),
    Empty,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_parses_case_insensitively() {
        assert_eq!(Provider::from_path("google"), Some(Provider::Google));
        assert_eq!(Provider::from_path("KAKAO"), Some(Provider::Kakao));
        assert_eq!(Provider::from_path("naver"), None);
    }

    #[test]
    fn redirect_uri_joins_without_double_slash() {
        assert_eq!(
            Provider::Google.redirect_uri("https://app.example.com/"),
            "https://app.example.com/oauth/google"
        );
    }

    #[test]
    fn exchange_result_deserializes_camel_case() {
        let json = serde_json::json!({
            "accessToken": "a1",
            "refreshToken": "r1",
            "user": {
                "id": 7,
                "email": "user@example.com",
                "nickname": "user",
                "image": null,
                "teamId": "team-3",
                "createdAt": "2024-01-01T00:00:00Z",
                "updatedAt": "2024-01-02T00:00:00Z"
            }
        });

        let result: OAuthExchangeResult = serde_json::from_value(json).unwrap();
        assert_eq!(result.access_token, "a1");
        assert_eq!(result.user.team_id.as_deref(), Some("team-3"));
    }
}
