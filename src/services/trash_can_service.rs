use serde::Serialize;
use serde_json::json;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::database::{self, trash_can_repo};
use crate::error::AppError;
use crate::models::TrashCanRow;
use crate::services::connection_registry::{ConnectionRegistry, WsMsg};
use crate::services::image_service::{self, ImageUpload};
use crate::services::nearby_search::{self, QueryPoint};
use crate::services::reaction_service;
use crate::web::response;

const NOT_FOUND_OR_FORBIDDEN: &str = "trash can not found or permission denied";

#[derive(Debug, Clone, Copy)]
pub struct NearbyQuery {
    pub origin: QueryPoint,
    pub radius_km: f64,
    pub limit: i64,
}

#[derive(Debug, Serialize)]
pub struct NearbyTrashCan {
    #[serde(flatten)]
    pub trash_can: TrashCanRow,
    /// Kilometres from the query point.
    pub distance: f64,
    pub image_url: String,
    pub like_count: i64,
    pub dislike_count: i64,
}

#[derive(Debug, Serialize)]
pub struct TrashCanDetailView {
    pub id: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub description: String,
    pub image_url: String,
    pub like_count: i64,
    pub dislike_count: i64,
    pub user_action: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize)]
pub struct CreatedTrashCanView {
    pub id: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub image_url: String,
}

#[derive(Debug, Serialize)]
pub struct UpdatedTrashCanView {
    pub id: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub description: String,
    pub image_url: String,
    pub updated_at: String,
}

/// Raw multipart fields for create/update.
#[derive(Debug, Default)]
pub struct TrashCanForm {
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub image: Option<ImageUpload>,
}

pub async fn find_nearby(
    pool: &SqlitePool,
    query: NearbyQuery,
) -> Result<Vec<NearbyTrashCan>, AppError> {
    let candidates = trash_can_repo::list_all_trash_cans(pool).await?;
    let candidate_count = candidates.len();

    let ranked = nearby_search::nearby(candidates, query.origin, query.radius_km, query.limit);
    debug!(
        "📍 nearby ({}, {}) r={}km: {} of {} candidates",
        query.origin.latitude,
        query.origin.longitude,
        query.radius_km,
        ranked.len(),
        candidate_count
    );

    let ids: Vec<i64> = ranked.iter().map(|r| r.record.id).collect();
    let counts = reaction_service::load_counts(pool, &ids).await?;

    Ok(ranked
        .into_iter()
        .map(|r| {
            let c = counts.get(&r.record.id).copied().unwrap_or_default();
            NearbyTrashCan {
                image_url: image_service::image_url(&r.record.image_path),
                trash_can: r.record,
                distance: r.distance_km,
                like_count: c.like_count,
                dislike_count: c.dislike_count,
            }
        })
        .collect())
}

pub async fn load_detail(
    pool: &SqlitePool,
    id: i64,
    viewer_id: Option<i64>,
) -> Result<TrashCanDetailView, AppError> {
    let Some(row) = trash_can_repo::load_trash_can(pool, id).await? else {
        return Err(AppError::NotFound("trash can not found".to_string()));
    };

    let counts = reaction_service::load_counts_for(pool, id).await?;
    let user_action = match viewer_id {
        Some(user_id) => reaction_service::user_action(pool, user_id, id).await?,
        None => 0,
    };

    Ok(TrashCanDetailView {
        id: row.id,
        latitude: row.latitude,
        longitude: row.longitude,
        image_url: image_service::image_url(&row.image_path),
        address: row.address,
        description: row.description,
        like_count: counts.like_count,
        dislike_count: counts.dislike_count,
        user_action,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

pub async fn create_trash_can(
    pool: &SqlitePool,
    connections: &ConnectionRegistry,
    upload_dir: &str,
    owner_id: i64,
    form: TrashCanForm,
) -> Result<CreatedTrashCanView, AppError> {
    let latitude = parse_coordinate(form.latitude.as_deref())?;
    let longitude = parse_coordinate(form.longitude.as_deref())?;
    let address = form.address.unwrap_or_default();
    let description = form.description.unwrap_or_default();

    let image_path = match &form.image {
        Some(upload) => image_service::save_image(upload, upload_dir).await?,
        None => String::new(),
    };

    let now = database::now_timestamp();
    let inserted = trash_can_repo::insert_trash_can(
        pool,
        trash_can_repo::NewTrashCan {
            user_id: Some(owner_id),
            latitude,
            longitude,
            address: &address,
            description: &description,
            image_path: &image_path,
            created_at: &now,
        },
    )
    .await;

    let id = match inserted {
        Ok(id) => id,
        Err(e) => {
            image_service::remove_image(&image_path).await;
            return Err(e.into());
        }
    };

    info!("🗑️ Trash can {} created by user {}", id, owner_id);
    connections.broadcast(&WsMsg {
        code: response::SUCCESS,
        data: Some(json!({ "id": id, "latitude": latitude, "longitude": longitude })),
        msg: "trash can created".to_string(),
        operation: "trashcan_created".to_string(),
    });

    Ok(CreatedTrashCanView {
        id,
        latitude,
        longitude,
        address,
        image_url: image_service::image_url(&image_path),
    })
}

/// Address and description are always overwritten; a missing field clears it.
pub async fn update_trash_can(
    pool: &SqlitePool,
    upload_dir: &str,
    owner_id: i64,
    id: i64,
    form: TrashCanForm,
) -> Result<UpdatedTrashCanView, AppError> {
    let Some(existing) = trash_can_repo::load_owned_trash_can(pool, id, owner_id).await? else {
        return Err(AppError::NotFound(NOT_FOUND_OR_FORBIDDEN.to_string()));
    };

    let address = form.address.unwrap_or_default();
    let description = form.description.unwrap_or_default();
    let new_image_path = match &form.image {
        Some(upload) => Some(image_service::save_image(upload, upload_dir).await?),
        None => None,
    };

    let now = database::now_timestamp();
    let updated = trash_can_repo::update_trash_can_details(
        pool,
        id,
        trash_can_repo::TrashCanDetailsUpdate {
            address: &address,
            description: &description,
            image_path: new_image_path.as_deref(),
            updated_at: &now,
        },
    )
    .await;

    if let Err(e) = updated {
        if let Some(path) = &new_image_path {
            image_service::remove_image(path).await;
        }
        return Err(e.into());
    }

    if new_image_path.is_some() {
        image_service::remove_image(&existing.image_path).await;
    }

    let Some(row) = trash_can_repo::load_trash_can(pool, id).await? else {
        return Err(AppError::NotFound(NOT_FOUND_OR_FORBIDDEN.to_string()));
    };

    Ok(UpdatedTrashCanView {
        id: row.id,
        latitude: row.latitude,
        longitude: row.longitude,
        image_url: image_service::image_url(&row.image_path),
        address: row.address,
        description: row.description,
        updated_at: row.updated_at,
    })
}

pub async fn delete_trash_can(
    pool: &SqlitePool,
    connections: &ConnectionRegistry,
    owner_id: i64,
    id: i64,
) -> Result<(), AppError> {
    let Some(existing) = trash_can_repo::load_owned_trash_can(pool, id, owner_id).await? else {
        return Err(AppError::NotFound(NOT_FOUND_OR_FORBIDDEN.to_string()));
    };

    trash_can_repo::delete_trash_can(pool, id).await?;
    image_service::remove_image(&existing.image_path).await;

    info!("🗑️ Trash can {} deleted by user {}", id, owner_id);
    connections.broadcast(&WsMsg {
        code: response::SUCCESS,
        data: Some(json!({ "id": id })),
        msg: "trash can deleted".to_string(),
        operation: "trashcan_deleted".to_string(),
    });
    Ok(())
}

fn parse_coordinate(raw: Option<&str>) -> Result<f64, AppError> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(AppError::param)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_must_be_present_and_numeric() {
        assert_eq!(parse_coordinate(Some("31.19")).unwrap(), 31.19);
        assert_eq!(parse_coordinate(Some(" -121.5 ")).unwrap(), -121.5);
        assert!(matches!(parse_coordinate(None), Err(AppError::Param(_))));
        assert!(matches!(parse_coordinate(Some("")), Err(AppError::Param(_))));
        assert!(matches!(parse_coordinate(Some("north")), Err(AppError::Param(_))));
    }

    #[test]
    fn nearby_rows_flatten_into_one_object() {
        let row = NearbyTrashCan {
            trash_can: TrashCanRow {
                id: 4,
                user_id: None,
                latitude: 31.194,
                longitude: 121.4125,
                address: "Nanjing Rd".to_string(),
                description: String::new(),
                image_path: "uploads/trashcans/x.jpg".to_string(),
                created_at: "2026-01-01 00:00:00".to_string(),
                updated_at: "2026-01-01 00:00:00".to_string(),
            },
            distance: 0.107,
            image_url: "/uploads/trashcans/x.jpg".to_string(),
            like_count: 2,
            dislike_count: 0,
        };

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["id"], 4);
        assert!(json["user_id"].is_null());
        assert_eq!(json["distance"], 0.107);
        assert_eq!(json["image_url"], "/uploads/trashcans/x.jpg");
        assert_eq!(json["like_count"], 2);
    }
}
