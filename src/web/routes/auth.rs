use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use cookie::{time::Duration, Cookie, SameSite};
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::services::user_service::{self, UserView};
use crate::state::AppState;
use crate::web::middleware::auth::ACCESS_TOKEN_COOKIE;
use crate::web::response::{self, ApiResponse};

#[derive(Deserialize)]
pub struct CredentialsBody {
    username: String,
    password: String,
}

pub async fn register_handler(
    State(state): State<AppState>,
    body: Result<Json<CredentialsBody>, JsonRejection>,
) -> AppResult<Json<ApiResponse<UserView>>> {
    let Json(body) = body.map_err(|e| {
        warn!("register body rejected: {}", e);
        AppError::param()
    })?;

    let user = user_service::register(&state.pool, &body.username, &body.password).await?;
    Ok(response::ok_with_detailed(user, "registered"))
}

pub async fn login_handler(
    State(state): State<AppState>,
    body: Result<Json<CredentialsBody>, JsonRejection>,
) -> AppResult<Response> {
    let Json(body) = body.map_err(|e| {
        warn!("login body rejected: {}", e);
        AppError::param()
    })?;

    let now = chrono::Utc::now().timestamp();
    let view = user_service::login(
        &state.pool,
        &state.config,
        &body.username,
        &body.password,
        now,
    )
    .await?;

    let mut access_cookie = Cookie::new(ACCESS_TOKEN_COOKIE, view.token.clone());
    access_cookie.set_path("/");
    access_cookie.set_http_only(true);
    access_cookie.set_same_site(SameSite::Lax);
    access_cookie.set_max_age(Duration::hours(state.config.jwt_expire_hours));

    info!("🔐 User {} logged in", view.user.username);
    let mut response = response::ok_with_detailed(view, "login successful").into_response();
    response
        .headers_mut()
        .append(header::SET_COOKIE, cookie_header(&access_cookie)?);
    Ok(response)
}

/// Tokens are stateless; logging out only clears the browser cookie.
pub async fn logout_handler() -> AppResult<Response> {
    let mut access_cookie = Cookie::new(ACCESS_TOKEN_COOKIE, "");
    access_cookie.set_path("/");
    access_cookie.set_http_only(true);
    access_cookie.set_same_site(SameSite::Lax);
    access_cookie.make_removal();

    let mut response = response::ok_with_message("logged out").into_response();
    response
        .headers_mut()
        .append(header::SET_COOKIE, cookie_header(&access_cookie)?);
    Ok(response)
}

fn cookie_header(cookie: &Cookie<'_>) -> AppResult<HeaderValue> {
    HeaderValue::from_str(&cookie.to_string())
        .map_err(|e| AppError::Internal(format!("invalid cookie header: {}", e)))
}
