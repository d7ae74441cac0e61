use serde::Serialize;

use crate::services::nearby_search::Located;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TrashCanRow {
    pub id: i64,
    pub user_id: Option<i64>,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub description: String,
    pub image_path: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Located for TrashCanRow {
    fn latitude(&self) -> f64 {
        self.latitude
    }

    fn longitude(&self) -> f64 {
        self.longitude
    }
}
