use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::error::AppError;
use crate::services::token_service;
use crate::state::AppState;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub username: String,
}

/// Rejects the request with 401 unless it carries a valid token.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(&state, request.headers()) {
        Some(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        None => AppError::unauthorized().into_response(),
    }
}

/// Attaches the user when a valid token is present and lets everyone else through.
pub async fn optional_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(user) = authenticate(&state, request.headers()) {
        request.extensions_mut().insert(user);
    }
    next.run(request).await
}

fn authenticate(state: &AppState, headers: &HeaderMap) -> Option<AuthenticatedUser> {
    let token = extract_token(headers)?;
    let now = chrono::Utc::now().timestamp();

    match token_service::verify_token(&state.config.jwt_secret, &token, now) {
        Ok(claims) => Some(AuthenticatedUser {
            id: claims.user_id()?,
            username: claims.username,
        }),
        Err(e) => {
            debug!("rejected token: {}", e);
            None
        }
    }
}

/// Bearer header wins over the cookie.
fn extract_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|hv| hv.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|hv| hv.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .map(str::trim)
        .find_map(|c| {
            c.strip_prefix(ACCESS_TOKEN_COOKIE)
                .and_then(|rest| rest.strip_prefix('='))
        })
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_header_is_preferred() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc.def.ghi"),
        );
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("access_token=cookie.token.x"),
        );
        assert_eq!(extract_token(&headers).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn cookie_is_used_without_a_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark;access_token=a.b.c; other=1"),
        );
        assert_eq!(extract_token(&headers).as_deref(), Some("a.b.c"));
    }

    #[test]
    fn missing_or_empty_tokens_yield_nothing() {
        let mut headers = HeaderMap::new();
        assert!(extract_token(&headers).is_none());

        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Basic dXNlcg=="),
        );
        headers.insert(header::COOKIE, HeaderValue::from_static("access_token="));
        assert!(extract_token(&headers).is_none());
    }
}
