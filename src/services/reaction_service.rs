use std::collections::HashMap;

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::debug;

use crate::database::{self, reaction_repo, trash_can_repo};
use crate::error::AppError;

const COUNT_CHUNK_SIZE: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    Like,
    Dislike,
}

impl Reaction {
    pub fn as_i64(self) -> i64 {
        match self {
            Reaction::Like => 1,
            Reaction::Dislike => -1,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReactionCounts {
    pub like_count: i64,
    pub dislike_count: i64,
}

#[derive(Debug, Serialize)]
pub struct ReactionToggleView {
    pub like_count: i64,
    pub dislike_count: i64,
    /// 1 = liked, -1 = disliked, 0 = nothing.
    pub user_action: i64,
}

/// Counts keyed by trash can id. Ids without reactions are absent.
pub async fn load_counts(
    pool: &SqlitePool,
    trash_can_ids: &[i64],
) -> sqlx::Result<HashMap<i64, ReactionCounts>> {
    let mut counts: HashMap<i64, ReactionCounts> = HashMap::new();

    // Nearby results are not capped, so keep each IN list well under SQLite's bind limit.
    for chunk in trash_can_ids.chunks(COUNT_CHUNK_SIZE) {
        for row in reaction_repo::count_reactions(pool, chunk).await? {
            let entry = counts.entry(row.trash_can_id).or_default();
            match row.reaction_type {
                1 => entry.like_count = row.count,
                -1 => entry.dislike_count = row.count,
                other => debug!("ignoring unknown reaction type {}", other),
            }
        }
    }
    Ok(counts)
}

pub async fn load_counts_for(pool: &SqlitePool, trash_can_id: i64) -> sqlx::Result<ReactionCounts> {
    let counts = load_counts(pool, &[trash_can_id]).await?;
    Ok(counts.get(&trash_can_id).copied().unwrap_or_default())
}

pub async fn user_action(pool: &SqlitePool, user_id: i64, trash_can_id: i64) -> sqlx::Result<i64> {
    Ok(reaction_repo::load_user_reaction(pool, user_id, trash_can_id)
        .await?
        .unwrap_or(0))
}

/// Same reaction twice removes it; the opposite reaction replaces it.
pub async fn toggle_reaction(
    pool: &SqlitePool,
    user_id: i64,
    trash_can_id: i64,
    reaction: Reaction,
) -> Result<ReactionToggleView, AppError> {
    if trash_can_repo::load_trash_can(pool, trash_can_id)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound("trash can not found".to_string()));
    }

    // Single statements only: concurrent toggles must not trip the
    // (user_id, trash_can_id) unique key.
    let wanted = reaction.as_i64();
    let removed =
        reaction_repo::delete_reaction_of_type(pool, user_id, trash_can_id, wanted).await?;
    let user_action = if removed > 0 {
        0
    } else {
        let now = database::now_timestamp();
        reaction_repo::upsert_reaction(pool, user_id, trash_can_id, wanted, &now).await?;
        wanted
    };

    let counts = load_counts_for(pool, trash_can_id).await?;
    Ok(ReactionToggleView {
        like_count: counts.like_count,
        dislike_count: counts.dislike_count,
        user_action,
    })
}
