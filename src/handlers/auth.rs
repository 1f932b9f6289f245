//! Auth Handlers
//!
//! Request handlers for the session lifecycle:
//! - OAuth login redirect and callback
//! - Silent access-token refresh
//! - Logout and the password-reset wrappers

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::CookieJar;
use bytes::Bytes;
use serde_json::{json, Value};
use std::sync::Arc;
use url::Url;

use crate::config::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{OAuthCallbackParams, Provider};
use crate::services::{ProxyReply, UpstreamClient};
use crate::session::{self, CookiePolicy};

const LOGIN_PATH: &str = "/login";
const LOGIN_FAILED_PATH: &str = "/login?error=oauth_failed";
const ONBOARDING_PATH: &str = "/get-started";

fn redirect(location: &str) -> Response {
    // Redirect targets can contain upstream-derived values, so an invalid
    // header value must degrade to the login-failure redirect, not a panic.
    let location = HeaderValue::from_str(location)
        .unwrap_or_else(|_| HeaderValue::from_static(LOGIN_FAILED_PATH));

    let mut response = StatusCode::FOUND.into_response();
    response.headers_mut().insert(header::LOCATION, location);
    response
}

/// Redirect the browser to the provider's authorize endpoint
///
/// GET /api/auth/:provider
pub async fn login(
    State(state): State<Arc<AppState>>,
    Path(provider): Path<String>,
) -> AppResult<Response> {
    let provider = Provider::from_path(&provider)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown OAuth provider: {provider}")))?;

    // Fail here rather than letting the provider reject the request later
    // with a far less actionable error.
    let client_id = state
        .config
        .oauth
        .client_id(provider)
        .ok_or_else(|| AppError::Config(format!("{provider} client id is not configured")))?;

    let redirect_uri = provider.redirect_uri(&state.config.server.base_url);

    let mut authorize_url = Url::parse(provider.authorize_endpoint())
        .map_err(|e| AppError::Internal(format!("Invalid authorize endpoint: {e}")))?;
    {
        let mut query = authorize_url.query_pairs_mut();
        query.append_pair("client_id", client_id);
        query.append_pair("redirect_uri", &redirect_uri);
        query.append_pair("response_type", "code");
        if let Some(scope) = provider.scope() {
            query.append_pair("scope", scope);
        }
    }

    tracing::info!(provider = %provider, "Redirecting to OAuth provider");

    Ok(redirect(authorize_url.as_str()))
}

/// Handle the OAuth callback
///
/// GET /oauth/:provider?code=...
///
/// Exchanges the authorization code for a token pair and commits it to the
/// session cookies. Every failure on this path becomes a login redirect; an
/// unauthenticated browser never sees a 500 or an upstream error body.
pub async fn oauth_callback(
    State(state): State<Arc<AppState>>,
    Path(provider): Path<String>,
    Query(params): Query<OAuthCallbackParams>,
    jar: CookieJar,
) -> (CookieJar, Response) {
    let Some(provider) = Provider::from_path(&provider) else {
        return (jar, redirect(LOGIN_PATH));
    };

    if let Some(error) = params.error.as_deref() {
        tracing::warn!(provider = %provider, error = %error, "OAuth provider returned an error");
        return (jar, redirect(LOGIN_PATH));
    }
    let Some(code) = params.code.as_deref() else {
        tracing::warn!(provider = %provider, "OAuth callback missing authorization code");
        return (jar, redirect(LOGIN_PATH));
    };

    let client = UpstreamClient::new(state.clone());
    match client.exchange_code(provider, code).await {
        Ok(result) => {
            let policy = CookiePolicy::from_config(&state.config);
            let jar = session::set_session(jar, &policy, &result.access_token, &result.refresh_token);

            // The team id comes from the upstream response; encode it so it
            // can never smuggle header or path metacharacters into Location.
            let target = match result.user.team_id.as_deref() {
                Some(team_id) if !team_id.is_empty() => {
                    format!("/{}", urlencoding::encode(team_id))
                }
                _ => ONBOARDING_PATH.to_string(),
            };

            tracing::info!(provider = %provider, user_id = result.user.id, "OAuth exchange succeeded");
            (jar, redirect(&target))
        }
        Err(e) => {
            tracing::warn!(provider = %provider, error = %e, "OAuth exchange failed");
            (jar, redirect(LOGIN_FAILED_PATH))
        }
    }
}

/// Mint a new access token from the refresh cookie
///
/// POST /api/auth/refresh
///
/// Only the access cookie is rewritten; the refresh token stays as-is. An
/// upstream rejection is relayed verbatim and the refresh cookie is left
/// untouched - whether to force a logout is the caller's decision. The
/// caller is also responsible for replaying whatever request hit the 401
/// that triggered this refresh.
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<Value>)> {
    let Some(refresh_token) = session::refresh_token(&jar) else {
        return Err(AppError::Unauthenticated(
            "리프레시 토큰이 없습니다.".to_string(),
        ));
    };

    let client = UpstreamClient::new(state.clone());
    let access_token = client.refresh_access_token(&refresh_token).await?;

    let policy = CookiePolicy::from_config(&state.config);
    let jar = session::set_access_token(jar, &policy, &access_token);

    tracing::debug!("Access token refreshed");

    Ok((jar, Json(json!({ "success": true }))))
}

/// Handle logout
///
/// POST /api/auth/logout
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<Value>) {
    (
        session::clear_session(jar),
        Json(json!({ "success": true, "message": "Logged out" })),
    )
}

/// PATCH /api/auth/reset-password
pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(body): Json<Value>,
) -> AppResult<ProxyReply> {
    forward_json(state, jar, Method::PATCH, "user/reset-password", body).await
}

/// POST /api/auth/send-reset-password-email
pub async fn send_reset_password_email(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(body): Json<Value>,
) -> AppResult<ProxyReply> {
    forward_json(
        state,
        jar,
        Method::POST,
        "user/send-reset-password-email",
        body,
    )
    .await
}

/// Thin delegation to the generic forward path for the fixed auth routes
async fn forward_json(
    state: Arc<AppState>,
    jar: CookieJar,
    method: Method,
    path: &str,
    body: Value,
) -> AppResult<ProxyReply> {
    let token = session::access_token(&jar);
    let bytes = Bytes::from(serde_json::to_vec(&body)?);

    let client = UpstreamClient::new(state);
    client
        .forward(
            method,
            path,
            None,
            Some(bytes),
            Some("application/json"),
            token.as_deref(),
        )
        .await
}
