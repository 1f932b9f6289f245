//! Upstream API Client
//!
//! Handles communication with the upstream task API, including:
//! - OAuth code exchange and token refresh
//! - Generic request relaying with bearer credential injection
//! - Byte-for-byte multipart forwarding

use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use serde_json::{json, Value};
use std::sync::Arc;
use url::Url;

use crate::config::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{OAuthExchangeResult, Provider, RefreshResult, UpstreamBody};

/// Maximum request body accepted from the browser (10MB)
pub const MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

/// A relayed upstream response: the original status plus the opaque body union.
#[derive(Debug)]
pub struct ProxyReply {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: UpstreamBody,
}

impl IntoResponse for ProxyReply {
    fn into_response(self) -> Response {
        match self.body {
            UpstreamBody::Empty => self.status.into_response(),
            UpstreamBody::Json(value) => (self.status, axum::Json(value)).into_response(),
            UpstreamBody::Text(text) => {
                let mut response = (self.status, text).into_response();
                if let Some(ct) = self
                    .content_type
                    .as_deref()
                    .and_then(|ct| HeaderValue::from_str(ct).ok())
                {
                    response.headers_mut().insert(CONTENT_TYPE, ct);
                }
                response
            }
        }
    }
}

/// Resolve a browser-relative path against the upstream base URL.
///
/// Rejects anything that parses as an absolute URL so the gateway cannot be
/// used as an open proxy to arbitrary hosts.
fn resolve_relative(base_url: &str, relative_path: &str) -> AppResult<String> {
    if Url::parse(relative_path).is_ok() {
        tracing::warn!(path = %relative_path, "Rejected absolute URL in proxy path");
        return Err(AppError::BadRequest(
            "Proxy paths must be relative to the upstream API".to_string(),
        ));
    }

    Ok(format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        relative_path.trim_start_matches('/')
    ))
}

/// Client for making requests to the upstream task API
pub struct UpstreamClient {
    state: Arc<AppState>,
}

impl UpstreamClient {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    fn resolve(&self, relative_path: &str) -> AppResult<String> {
        resolve_relative(&self.state.config.upstream.base_url, relative_path)
    }

    /// Exchange an OAuth authorization code for a token pair.
    ///
    /// POST auth/signIn/{PROVIDER} with `{ code, redirectUri }`.
    pub async fn exchange_code(
        &self,
        provider: Provider,
        code: &str,
    ) -> AppResult<OAuthExchangeResult> {
        let url = self.resolve(&format!("auth/signIn/{}", provider.upstream_name()))?;
        let redirect_uri = provider.redirect_uri(&self.state.config.server.base_url);

        let response = self
            .state
            .http_client
            .post(&url)
            .json(&json!({ "code": code, "redirectUri": redirect_uri }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = read_error_body(response).await;
            return Err(AppError::Upstream { status, body });
        }

        Ok(response.json().await?)
    }

    /// Mint a new access token from a refresh token.
    ///
    /// The refresh token itself is never rotated here; this upstream keeps
    /// refresh tokens stable across refreshes.
    pub async fn refresh_access_token(&self, refresh_token: &str) -> AppResult<String> {
        let url = self.resolve("auth/refresh-token")?;

        let response = self
            .state
            .http_client
            .post(&url)
            .json(&json!({ "refreshToken": refresh_token }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = read_error_body(response).await;
            return Err(AppError::Upstream { status, body });
        }

        let parsed: RefreshResult = response.json().await?;
        Ok(parsed.access_token)
    }

    /// Relay an arbitrary request to the upstream base.
    ///
    /// The bearer header is attached only when a token is present; requests
    /// without a session still go upstream so public endpoints keep working.
    /// Performs no local mutation, so callers may retry at their discretion.
    pub async fn forward(
        &self,
        method: Method,
        relative_path: &str,
        query: Option<&str>,
        body: Option<Bytes>,
        content_type: Option<&str>,
        bearer: Option<&str>,
    ) -> AppResult<ProxyReply> {
        let mut url = self.resolve(relative_path)?;
        if let Some(qs) = query {
            url = format!("{}?{}", url, qs);
        }

        let mut request = self.state.http_client.request(method, &url);

        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        if let Some(ct) = content_type {
            request = request.header(CONTENT_TYPE, ct);
        }
        if let Some(b) = body {
            request = request.body(b);
        }

        let response = request.send().await?;
        relay(response).await
    }

    /// Relay a multipart payload byte-for-byte.
    ///
    /// The original boundary lives in the content type, so the body must not
    /// be decoded or re-serialized on the way through.
    pub async fn forward_multipart(
        &self,
        relative_path: &str,
        content_type: &str,
        body: Bytes,
        bearer: &str,
    ) -> AppResult<ProxyReply> {
        let url = self.resolve(relative_path)?;

        let response = self
            .state
            .http_client
            .post(&url)
            .bearer_auth(bearer)
            .header(CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await?;

        relay(response).await
    }
}

/// Turn an upstream response into a relayable reply.
///
/// 204 short-circuits to an empty body. JSON bodies are parsed and
/// re-serialized; anything else passes through as raw text. Non-2xx statuses
/// are still Ok here: the gateway relays the upstream error taxonomy rather
/// than synthesizing its own, and a malformed error body collapses to `{}`.
async fn relay(response: reqwest::Response) -> AppResult<ProxyReply> {
    let status = response.status();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    if status == StatusCode::NO_CONTENT {
        return Ok(ProxyReply {
            status,
            content_type: None,
            body: UpstreamBody::Empty,
        });
    }

    let is_json = content_type
        .as_deref()
        .map(|ct| ct.contains("application/json"))
        .unwrap_or(false);

    if status.is_success() {
        let body = if is_json {
            UpstreamBody::Json(response.json().await?)
        } else {
            let text = response.text().await?;
            if text.is_empty() {
                UpstreamBody::Empty
            } else {
                UpstreamBody::Text(text)
            }
        };
        return Ok(ProxyReply {
            status,
            content_type,
            body,
        });
    }

    let text = response.text().await.unwrap_or_default();
    let body = if is_json || text.is_empty() {
        serde_json::from_str(&text)
            .map(UpstreamBody::Json)
            .unwrap_or(UpstreamBody::Json(json!({})))
    } else {
        UpstreamBody::Text(text)
    };

    Ok(ProxyReply {
        status,
        content_type,
        body,
    })
}

/// Best-effort read of an upstream error body for the auth endpoints
async fn read_error_body(response: reqwest::Response) -> UpstreamBody {
    match response.text().await {
        Ok(text) if text.is_empty() => UpstreamBody::Empty,
        Ok(text) => serde_json::from_str(&text)
            .map(UpstreamBody::Json)
            .unwrap_or(UpstreamBody::Text(text)),
        Err(_) => UpstreamBody::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_joins_against_base() {
        assert_eq!(
            resolve_relative("https://api.example.com", "user/me").unwrap(),
            "https://api.example.com/user/me"
        );
        assert_eq!(
            resolve_relative("https://api.example.com/", "/groups/1/tasks").unwrap(),
            "https://api.example.com/groups/1/tasks"
        );
    }

    #[test]
    fn resolve_rejects_absolute_urls() {
        assert!(resolve_relative("https://api.example.com", "https://evil.example/steal").is_err());
        assert!(resolve_relative("https://api.example.com", "http://169.254.169.254/").is_err());
        // Anything with a scheme counts as absolute, not just http(s)
        assert!(resolve_relative("https://api.example.com", "file:///etc/passwd").is_err());
    }

    #[test]
    fn resolve_neutralizes_protocol_relative_paths() {
        // "//host/path" does not parse as absolute, but the leading slashes
        // must not survive into the joined URL
        let url = resolve_relative("https://api.example.com", "//evil.example/x").unwrap();
        assert_eq!(url, "https://api.example.com/evil.example/x");
    }
}
