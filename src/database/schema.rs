use sqlx::SqlitePool;
use tracing::info;

const SQL_CREATE_USERS: &str = r#"
CREATE TABLE IF NOT EXISTS users (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  username TEXT NOT NULL UNIQUE,
  password_hash TEXT NOT NULL,
  created_at TEXT NOT NULL,
  updated_at TEXT NOT NULL
)
"#;

const SQL_CREATE_TRASH_CANS: &str = r#"
CREATE TABLE IF NOT EXISTS trash_cans (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  user_id INTEGER NULL REFERENCES users(id),
  latitude REAL NOT NULL,
  longitude REAL NOT NULL,
  address TEXT NOT NULL DEFAULT '',
  description TEXT NOT NULL DEFAULT '',
  image_path TEXT NOT NULL DEFAULT '',
  created_at TEXT NOT NULL,
  updated_at TEXT NOT NULL
)
"#;

const SQL_CREATE_TRASH_CANS_USER_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_trash_cans_user_id ON trash_cans (user_id)
"#;

const SQL_CREATE_TRASH_CAN_LIKES: &str = r#"
CREATE TABLE IF NOT EXISTS trash_can_likes (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  user_id INTEGER NOT NULL REFERENCES users(id),
  trash_can_id INTEGER NOT NULL REFERENCES trash_cans(id),
  type INTEGER NOT NULL,
  created_at TEXT NOT NULL,
  UNIQUE (user_id, trash_can_id)
)
"#;

const SQL_CREATE_TRASH_CAN_LIKES_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_trash_can_likes_trash_can_id ON trash_can_likes (trash_can_id)
"#;

pub async fn ensure_schema(pool: &SqlitePool) -> sqlx::Result<()> {
    for stmt in [
        SQL_CREATE_USERS,
        SQL_CREATE_TRASH_CANS,
        SQL_CREATE_TRASH_CANS_USER_INDEX,
        SQL_CREATE_TRASH_CAN_LIKES,
        SQL_CREATE_TRASH_CAN_LIKES_INDEX,
    ] {
        sqlx::query(stmt).execute(pool).await?;
    }
    info!("🗄️  Schema ready");
    Ok(())
}
