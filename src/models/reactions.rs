// Aggregated like/dislike count for one trash can and one reaction type.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReactionCountRow {
    pub trash_can_id: i64,
    pub reaction_type: i64,
    pub count: i64,
}
