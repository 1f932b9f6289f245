//! Session cookie store
//!
//! The browser session is nothing but two HttpOnly cookies on the gateway's
//! own origin: a short-lived access token and a longer-lived refresh token.
//! There is no in-process session cache; the cookie jar attached to each
//! request/response pair is the sole source of truth, so every function here
//! is a pure jar-in, jar-out transformation.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use crate::config::AppConfig;

/// Cookie holding the upstream access token
pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";

/// Cookie holding the upstream refresh token
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

/// Attributes shared by both session cookies
#[derive(Debug, Clone, Copy)]
pub struct CookiePolicy {
    /// Secure flag; set in production where the gateway is served over HTTPS
    pub secure: bool,
    pub access_max_age: Duration,
    pub refresh_max_age: Duration,
}

impl CookiePolicy {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            secure: config.server.production,
            access_max_age: Duration::seconds(config.session.access_max_age_seconds),
            refresh_max_age: Duration::seconds(config.session.refresh_max_age_seconds),
        }
    }
}

fn build_cookie(name: &'static str, value: String, policy: &CookiePolicy, max_age: Duration) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .secure(policy.secure)
        .same_site(SameSite::Lax)
        .max_age(max_age)
        .build()
}

/// Write both session cookies in a single response.
///
/// The tokens travel only as Set-Cookie headers, never in a response body.
pub fn set_session(
    jar: CookieJar,
    policy: &CookiePolicy,
    access_token: &str,
    refresh_token: &str,
) -> CookieJar {
    let jar = set_access_token(jar, policy, access_token);
    jar.add(build_cookie(
        REFRESH_TOKEN_COOKIE,
        refresh_token.to_owned(),
        policy,
        policy.refresh_max_age,
    ))
}

/// Overwrite only the access cookie (used by the refresh handler)
pub fn set_access_token(jar: CookieJar, policy: &CookiePolicy, access_token: &str) -> CookieJar {
    jar.add(build_cookie(
        ACCESS_TOKEN_COOKIE,
        access_token.to_owned(),
        policy,
        policy.access_max_age,
    ))
}

/// Expire both session cookies.
///
/// Idempotent: clearing an absent session is a no-op, not an error. The
/// removal cookies carry the same path as the originals or browsers would
/// keep the old values.
pub fn clear_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build((ACCESS_TOKEN_COOKIE, "")).path("/").build())
        .remove(Cookie::build((REFRESH_TOKEN_COOKIE, "")).path("/").build())
}

/// Read the access token from the request cookies
pub fn access_token(jar: &CookieJar) -> Option<String> {
    read_token(jar, ACCESS_TOKEN_COOKIE)
}

/// Read the refresh token from the request cookies
pub fn refresh_token(jar: &CookieJar) -> Option<String> {
    read_token(jar, REFRESH_TOKEN_COOKIE)
}

fn read_token(jar: &CookieJar, name: &str) -> Option<String> {
    jar.get(name)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_policy() -> CookiePolicy {
        CookiePolicy {
            secure: false,
            access_max_age: Duration::seconds(3600),
            refresh_max_age: Duration::days(14),
        }
    }

    #[test]
    fn set_session_writes_both_cookies() {
        let jar = set_session(CookieJar::new(), &test_policy(), "a1", "r1");

        assert_eq!(access_token(&jar).as_deref(), Some("a1"));
        assert_eq!(refresh_token(&jar).as_deref(), Some("r1"));

        let access = jar.get(ACCESS_TOKEN_COOKIE).unwrap();
        assert_eq!(access.http_only(), Some(true));
        assert_eq!(access.same_site(), Some(SameSite::Lax));
        assert_eq!(access.path(), Some("/"));
        assert_eq!(access.max_age(), Some(Duration::seconds(3600)));
    }

    #[test]
    fn set_access_token_leaves_refresh_untouched() {
        let jar = set_session(CookieJar::new(), &test_policy(), "a1", "r1");
        let jar = set_access_token(jar, &test_policy(), "a2");

        assert_eq!(access_token(&jar).as_deref(), Some("a2"));
        assert_eq!(refresh_token(&jar).as_deref(), Some("r1"));
    }

    #[test]
    fn read_returns_none_when_absent_or_empty() {
        let jar = CookieJar::new();
        assert_eq!(access_token(&jar), None);

        let jar = jar.add(Cookie::new(ACCESS_TOKEN_COOKIE, ""));
        assert_eq!(access_token(&jar), None);
    }

    #[test]
    fn clear_session_is_idempotent() {
        let jar = set_session(CookieJar::new(), &test_policy(), "a1", "r1");
        let jar = clear_session(jar);
        assert_eq!(access_token(&jar), None);
        assert_eq!(refresh_token(&jar), None);

        // Second clear on an already-empty jar must not error
        let jar = clear_session(jar);
        assert_eq!(access_token(&jar), None);
        assert_eq!(refresh_token(&jar), None);
    }
}
