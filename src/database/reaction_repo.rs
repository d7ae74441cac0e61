use sqlx::{sqlite::SqliteArguments, Arguments, SqlitePool};

use crate::models::ReactionCountRow;

pub const SQL_COUNT_REACTIONS_BASE: &str = r#"
SELECT
    trash_can_id,
    type AS reaction_type,
    COUNT(*) AS count
FROM trash_can_likes
"#;

pub const SQL_LOAD_USER_REACTION: &str = r#"
SELECT type
FROM trash_can_likes
WHERE user_id = ?1
  AND trash_can_id = ?2
LIMIT 1
"#;

const SQL_UPSERT_REACTION: &str = r#"
INSERT INTO trash_can_likes (
  user_id,
  trash_can_id,
  type,
  created_at
) VALUES (?1, ?2, ?3, ?4)
ON CONFLICT (user_id, trash_can_id) DO UPDATE SET type = excluded.type
"#;

const SQL_DELETE_REACTION_OF_TYPE: &str = r#"
DELETE FROM trash_can_likes
WHERE user_id = ?1
  AND trash_can_id = ?2
  AND type = ?3
"#;

/// Per-trash-can, per-type counts for the given ids.
pub async fn count_reactions(
    pool: &SqlitePool,
    trash_can_ids: &[i64],
) -> sqlx::Result<Vec<ReactionCountRow>> {
    if trash_can_ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut sql = String::from(SQL_COUNT_REACTIONS_BASE);
    let mut args = SqliteArguments::default();

    let placeholders = vec!["?"; trash_can_ids.len()].join(", ");
    sql.push_str(&format!(" WHERE trash_can_id IN ({})", placeholders));
    for id in trash_can_ids {
        args.add(*id);
    }
    sql.push_str(" GROUP BY trash_can_id, type");

    sqlx::query_as_with::<_, ReactionCountRow, _>(&sql, args)
        .fetch_all(pool)
        .await
}

pub async fn load_user_reaction(
    pool: &SqlitePool,
    user_id: i64,
    trash_can_id: i64,
) -> sqlx::Result<Option<i64>> {
    sqlx::query_scalar::<_, i64>(SQL_LOAD_USER_REACTION)
        .bind(user_id)
        .bind(trash_can_id)
        .fetch_optional(pool)
        .await
}

/// Inserts the reaction or overwrites the user's existing one in a single statement.
pub async fn upsert_reaction(
    pool: &SqlitePool,
    user_id: i64,
    trash_can_id: i64,
    reaction_type: i64,
    created_at: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_UPSERT_REACTION)
        .bind(user_id)
        .bind(trash_can_id)
        .bind(reaction_type)
        .bind(created_at)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

/// Removes the user's reaction only if it is of `reaction_type`.
pub async fn delete_reaction_of_type(
    pool: &SqlitePool,
    user_id: i64,
    trash_can_id: i64,
    reaction_type: i64,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_DELETE_REACTION_OF_TYPE)
        .bind(user_id)
        .bind(trash_can_id)
        .bind(reaction_type)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}
