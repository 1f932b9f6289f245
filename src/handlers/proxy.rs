//! Proxy Handlers
//!
//! The same-origin gateway: browser code issues relative API calls and the
//! server attaches the stored bearer credential transparently, so tokens
//! never reach client-side script.

use axum::{
    body::Body,
    extract::{Path, RawQuery, State},
    http::{header, HeaderMap, Method},
};
use axum_extra::extract::CookieJar;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::AppState;
use crate::error::{AppError, AppResult};
use crate::services::{ProxyReply, UpstreamClient, MAX_BODY_SIZE};
use crate::session;

/// Forward an arbitrary API call to the upstream base
///
/// ANY /api/proxy/*path
///
/// A missing access cookie does not fail the request: public endpoints stay
/// reachable through the proxy, and protected ones come back 401 from
/// upstream. Callers that need auth enforcement must check for a session
/// before calling protected paths.
pub async fn forward(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
    RawQuery(query_string): RawQuery,
    jar: CookieJar,
    method: Method,
    headers: HeaderMap,
    body: Body,
) -> AppResult<ProxyReply> {
    let request_id = Uuid::new_v4();

    // The query string goes upstream exactly as the browser sent it;
    // re-encoding through a map would drop repeated keys and reorder pairs.
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|h| h.to_str().ok())
        .map(str::to_owned);

    let body_bytes = axum::body::to_bytes(body, MAX_BODY_SIZE)
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read body: {e}")))?;
    let body = if body_bytes.is_empty() {
        None
    } else {
        Some(body_bytes)
    };

    let token = session::access_token(&jar);

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        has_token = token.is_some(),
        "Proxying request upstream"
    );

    let client = UpstreamClient::new(state);
    client
        .forward(
            method,
            &path,
            query_string.as_deref(),
            body,
            content_type.as_deref(),
            token.as_deref(),
        )
        .await
}

/// Multipart upload proxy
///
/// POST /api/images/upload
///
/// Multipart encoding must not be re-serialized, so the payload is relayed
/// byte-for-byte with its original boundary. Unlike the generic proxy this
/// path requires a session up front and fails fast without one.
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    headers: HeaderMap,
    body: Body,
) -> AppResult<ProxyReply> {
    let Some(token) = session::access_token(&jar) else {
        return Err(AppError::Unauthenticated("인증이 필요합니다.".to_string()));
    };

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|h| h.to_str().ok())
        .filter(|ct| ct.starts_with("multipart/form-data"))
        .ok_or_else(|| AppError::BadRequest("multipart/form-data body required".to_string()))?
        .to_owned();

    let body_bytes = axum::body::to_bytes(body, MAX_BODY_SIZE)
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read body: {e}")))?;

    let client = UpstreamClient::new(state);
    client
        .forward_multipart("images/upload", &content_type, body_bytes, &token)
        .await
}
