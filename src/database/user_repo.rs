use sqlx::SqlitePool;

use crate::models::UsersRow;

const SQL_INSERT_USER: &str = r#"
INSERT INTO users (
  username,
  password_hash,
  created_at,
  updated_at
) VALUES (?1, ?2, ?3, ?3)
"#;

pub const SQL_LOAD_USER_BY_USERNAME: &str = r#"
SELECT id, username, password_hash, created_at, updated_at
FROM users
WHERE username = ?1
LIMIT 1
"#;

pub const SQL_LOAD_USER_BY_ID: &str = r#"
SELECT id, username, password_hash, created_at, updated_at
FROM users
WHERE id = ?1
LIMIT 1
"#;

pub struct NewUser<'a> {
    pub username: &'a str,
    pub password_hash: &'a str,
    pub created_at: &'a str,
}

/// Returns the new user id.
pub async fn insert_user(pool: &SqlitePool, user: NewUser<'_>) -> sqlx::Result<i64> {
    let res = sqlx::query(SQL_INSERT_USER)
        .bind(user.username)
        .bind(user.password_hash)
        .bind(user.created_at)
        .execute(pool)
        .await?;
    Ok(res.last_insert_rowid())
}

pub async fn load_user_by_username(
    pool: &SqlitePool,
    username: &str,
) -> sqlx::Result<Option<UsersRow>> {
    sqlx::query_as::<_, UsersRow>(SQL_LOAD_USER_BY_USERNAME)
        .bind(username)
        .fetch_optional(pool)
        .await
}

pub async fn load_user_by_id(pool: &SqlitePool, user_id: i64) -> sqlx::Result<Option<UsersRow>> {
    sqlx::query_as::<_, UsersRow>(SQL_LOAD_USER_BY_ID)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}
