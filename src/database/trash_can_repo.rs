use sqlx::SqlitePool;

use crate::models::TrashCanRow;

// Nearby search ranks in memory, so this is intentionally unfiltered.
// Ordered by id so distance ties resolve by insertion order.
pub const SQL_LIST_ALL_TRASH_CANS: &str = r#"
SELECT id, user_id, latitude, longitude, address, description, image_path, created_at, updated_at
FROM trash_cans
ORDER BY id ASC
"#;

pub const SQL_LOAD_TRASH_CAN: &str = r#"
SELECT id, user_id, latitude, longitude, address, description, image_path, created_at, updated_at
FROM trash_cans
WHERE id = ?1
LIMIT 1
"#;

pub const SQL_LOAD_OWNED_TRASH_CAN: &str = r#"
SELECT id, user_id, latitude, longitude, address, description, image_path, created_at, updated_at
FROM trash_cans
WHERE id = ?1
  AND user_id = ?2
LIMIT 1
"#;

const SQL_INSERT_TRASH_CAN: &str = r#"
INSERT INTO trash_cans (
  user_id,
  latitude,
  longitude,
  address,
  description,
  image_path,
  created_at,
  updated_at
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
"#;

const SQL_UPDATE_TRASH_CAN_DETAILS: &str = r#"
UPDATE trash_cans
SET address = ?1, description = ?2, updated_at = ?3
WHERE id = ?4
"#;

const SQL_UPDATE_TRASH_CAN_DETAILS_AND_IMAGE: &str = r#"
UPDATE trash_cans
SET address = ?1, description = ?2, updated_at = ?3, image_path = ?4
WHERE id = ?5
"#;

const SQL_DELETE_TRASH_CAN_REACTIONS: &str = r#"
DELETE FROM trash_can_likes
WHERE trash_can_id = ?1
"#;

const SQL_DELETE_TRASH_CAN: &str = r#"
DELETE FROM trash_cans
WHERE id = ?1
"#;

const SQL_LIST_IMAGE_PATHS: &str = r#"
SELECT image_path
FROM trash_cans
WHERE image_path != ''
"#;

const SQL_DELETE_ALL_REACTIONS: &str = r#"
DELETE FROM trash_can_likes
"#;

const SQL_DELETE_ALL_TRASH_CANS: &str = r#"
DELETE FROM trash_cans
"#;

const SQL_COUNT_TRASH_CANS_BY_OWNER: &str = r#"
SELECT COUNT(*)
FROM trash_cans
WHERE user_id = ?1
"#;

pub const SQL_LIST_TRASH_CANS_BY_OWNER: &str = r#"
SELECT id, user_id, latitude, longitude, address, description, image_path, created_at, updated_at
FROM trash_cans
WHERE user_id = ?1
ORDER BY created_at DESC, id DESC
LIMIT ?2 OFFSET ?3
"#;

pub struct NewTrashCan<'a> {
    pub user_id: Option<i64>,
    pub latitude: f64,
    pub longitude: f64,
    pub address: &'a str,
    pub description: &'a str,
    pub image_path: &'a str,
    pub created_at: &'a str,
}

/// What a full clear removed: the row count and the image files left behind.
#[derive(Debug, Default)]
pub struct ClearedTrashCans {
    pub rows: u64,
    pub image_paths: Vec<String>,
}

pub struct TrashCanDetailsUpdate<'a> {
    pub address: &'a str,
    pub description: &'a str,
    pub image_path: Option<&'a str>,
    pub updated_at: &'a str,
}

pub async fn list_all_trash_cans(pool: &SqlitePool) -> sqlx::Result<Vec<TrashCanRow>> {
    sqlx::query_as::<_, TrashCanRow>(SQL_LIST_ALL_TRASH_CANS)
        .fetch_all(pool)
        .await
}

pub async fn load_trash_can(pool: &SqlitePool, id: i64) -> sqlx::Result<Option<TrashCanRow>> {
    sqlx::query_as::<_, TrashCanRow>(SQL_LOAD_TRASH_CAN)
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn load_owned_trash_can(
    pool: &SqlitePool,
    id: i64,
    user_id: i64,
) -> sqlx::Result<Option<TrashCanRow>> {
    sqlx::query_as::<_, TrashCanRow>(SQL_LOAD_OWNED_TRASH_CAN)
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn insert_trash_can(pool: &SqlitePool, row: NewTrashCan<'_>) -> sqlx::Result<i64> {
    let res = sqlx::query(SQL_INSERT_TRASH_CAN)
        .bind(row.user_id)
        .bind(row.latitude)
        .bind(row.longitude)
        .bind(row.address)
        .bind(row.description)
        .bind(row.image_path)
        .bind(row.created_at)
        .execute(pool)
        .await?;
    Ok(res.last_insert_rowid())
}

pub async fn update_trash_can_details(
    pool: &SqlitePool,
    id: i64,
    update: TrashCanDetailsUpdate<'_>,
) -> sqlx::Result<u64> {
    let res = match update.image_path {
        Some(image_path) => {
            sqlx::query(SQL_UPDATE_TRASH_CAN_DETAILS_AND_IMAGE)
                .bind(update.address)
                .bind(update.description)
                .bind(update.updated_at)
                .bind(image_path)
                .bind(id)
                .execute(pool)
                .await?
        }
        None => {
            sqlx::query(SQL_UPDATE_TRASH_CAN_DETAILS)
                .bind(update.address)
                .bind(update.description)
                .bind(update.updated_at)
                .bind(id)
                .execute(pool)
                .await?
        }
    };
    Ok(res.rows_affected())
}

/// Deletes the trash can together with its reactions.
pub async fn delete_trash_can(pool: &SqlitePool, id: i64) -> sqlx::Result<u64> {
    let mut tx = pool.begin().await?;
    sqlx::query(SQL_DELETE_TRASH_CAN_REACTIONS)
        .bind(id)
        .execute(&mut *tx)
        .await?;
    let res = sqlx::query(SQL_DELETE_TRASH_CAN)
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(res.rows_affected())
}

/// Empties the trash can table (and every reaction) before seeding.
pub async fn delete_all_trash_cans(pool: &SqlitePool) -> sqlx::Result<ClearedTrashCans> {
    let mut tx = pool.begin().await?;
    let image_paths = sqlx::query_scalar::<_, String>(SQL_LIST_IMAGE_PATHS)
        .fetch_all(&mut *tx)
        .await?;
    sqlx::query(SQL_DELETE_ALL_REACTIONS)
        .execute(&mut *tx)
        .await?;
    let res = sqlx::query(SQL_DELETE_ALL_TRASH_CANS)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(ClearedTrashCans {
        rows: res.rows_affected(),
        image_paths,
    })
}

pub async fn count_trash_cans_by_owner(pool: &SqlitePool, user_id: i64) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>(SQL_COUNT_TRASH_CANS_BY_OWNER)
        .bind(user_id)
        .fetch_one(pool)
        .await
}

pub async fn list_trash_cans_by_owner(
    pool: &SqlitePool,
    user_id: i64,
    limit: i64,
    offset: i64,
) -> sqlx::Result<Vec<TrashCanRow>> {
    sqlx::query_as::<_, TrashCanRow>(SQL_LIST_TRASH_CANS_BY_OWNER)
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
}
