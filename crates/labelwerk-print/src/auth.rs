// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bearer-token middleware for the print endpoint.

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;

use crate::http_server::{ApiError, AppState};

const BEARER_PREFIX: &str = "Bearer ";

/// Reject requests without `Authorization: Bearer <token>` matching the
/// configured token.
///
/// Missing header: 401. Header without the `Bearer ` prefix: 401. Wrong
/// token: 403.
pub async fn require_bearer(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = headers.get(AUTHORIZATION).ok_or(ApiError::MissingToken)?;
    let token = header
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .ok_or(ApiError::InvalidTokenFormat)?;

    if !state.token.matches(token) {
        return Err(ApiError::InvalidToken);
    }

    Ok(next.run(request).await)
}
