use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::database::{self, trash_can_repo, user_repo};
use crate::error::AppError;
use crate::models::TrashCanRow;
use crate::services::image_service;
use crate::services::token_service::{self, Claims};

const MIN_USERNAME_CHARS: usize = 3;
const MAX_USERNAME_CHARS: usize = 32;
const MIN_PASSWORD_CHARS: usize = 6;

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Serialize)]
pub struct UserView {
    pub id: i64,
    pub username: String,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct UserRef {
    pub id: i64,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct LoginView {
    pub token: String,
    pub expires_at: i64,
    pub user: UserRef,
}

#[derive(Debug, Serialize)]
pub struct CurrentUserView {
    pub id: i64,
    pub username: String,
    pub created_at: String,
    pub trashcan_count: i64,
}

#[derive(Debug, Serialize)]
pub struct OwnedTrashCanItem {
    pub id: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub description: String,
    pub image_url: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<TrashCanRow> for OwnedTrashCanItem {
    fn from(row: TrashCanRow) -> Self {
        Self {
            id: row.id,
            latitude: row.latitude,
            longitude: row.longitude,
            image_url: image_service::image_url(&row.image_path),
            address: row.address,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OwnedTrashCanPage {
    pub list: Vec<OwnedTrashCanItem>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

pub async fn register(
    pool: &SqlitePool,
    username: &str,
    password: &str,
) -> Result<UserView, AppError> {
    let username = username.trim();
    let name_len = username.chars().count();
    if !(MIN_USERNAME_CHARS..=MAX_USERNAME_CHARS).contains(&name_len) {
        return Err(AppError::Param(format!(
            "username must be {}-{} characters",
            MIN_USERNAME_CHARS, MAX_USERNAME_CHARS
        )));
    }
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(AppError::Param(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_CHARS
        )));
    }

    if user_repo::load_user_by_username(pool, username)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("username already taken".to_string()));
    }

    let password_hash = hash_password(password)?;
    let created_at = database::now_timestamp();
    let id = user_repo::insert_user(
        pool,
        user_repo::NewUser {
            username,
            password_hash: &password_hash,
            created_at: &created_at,
        },
    )
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Conflict("username already taken".to_string())
        }
        other => AppError::Database(other),
    })?;

    info!("👤 Registered user {} ({})", username, id);
    Ok(UserView {
        id,
        username: username.to_string(),
        created_at,
    })
}

pub async fn login(
    pool: &SqlitePool,
    config: &Config,
    username: &str,
    password: &str,
    now: i64,
) -> Result<LoginView, AppError> {
    let invalid = || AppError::Unauthorized("invalid username or password".to_string());

    let Some(user) = user_repo::load_user_by_username(pool, username.trim()).await? else {
        return Err(invalid());
    };
    if !verify_password(password, &user.password_hash) {
        warn!("Failed login for {}", user.username);
        return Err(invalid());
    }

    let claims = Claims::new(user.id, &user.username, now, config.jwt_expire_hours);
    let token = token_service::issue_token(&config.jwt_secret, &claims)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(LoginView {
        token,
        expires_at: claims.exp,
        user: UserRef {
            id: user.id,
            username: user.username,
        },
    })
}

pub async fn load_current_user(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<CurrentUserView, AppError> {
    let Some(user) = user_repo::load_user_by_id(pool, user_id).await? else {
        return Err(AppError::Unauthorized("user no longer exists".to_string()));
    };
    let trashcan_count = trash_can_repo::count_trash_cans_by_owner(pool, user_id).await?;

    Ok(CurrentUserView {
        id: user.id,
        username: user.username,
        created_at: user.created_at,
        trashcan_count,
    })
}

/// Page and size after defaulting; out-of-range values fall back instead of failing.
pub fn normalize_paging(page: Option<&str>, page_size: Option<&str>) -> (i64, i64) {
    let page = page
        .and_then(|p| p.trim().parse::<i64>().ok())
        .filter(|p| *p >= 1)
        .unwrap_or(1);
    let page_size = page_size
        .and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|s| *s >= 1)
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .min(MAX_PAGE_SIZE);
    (page, page_size)
}

pub async fn list_owned_trash_cans(
    pool: &SqlitePool,
    user_id: i64,
    page: i64,
    page_size: i64,
) -> Result<OwnedTrashCanPage, AppError> {
    let total = trash_can_repo::count_trash_cans_by_owner(pool, user_id).await?;
    let total_pages = ((total + page_size - 1) / page_size).max(1);

    let offset = (page - 1).saturating_mul(page_size);
    let rows = trash_can_repo::list_trash_cans_by_owner(pool, user_id, page_size, offset).await?;

    Ok(OwnedTrashCanPage {
        list: rows.into_iter().map(OwnedTrashCanItem::from).collect(),
        total,
        page,
        page_size,
        total_pages,
    })
}

fn hash_password(password: &str) -> Result<String, AppError> {
    // 16 random bytes from a v4 UUID make a valid argon2 salt.
    let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes())
        .map_err(|e| AppError::Internal(format!("salt encoding failed: {}", e)))?;
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("password hashing failed: {}", e)))
}

fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
