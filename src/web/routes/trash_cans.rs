use axum::{
    extract::{
        multipart::{Multipart, MultipartError, MultipartRejection},
        Path, Query, State,
    },
    Extension, Json,
};
use serde::Deserialize;
use tracing::warn;

use crate::error::{AppError, AppResult};
use crate::services::image_service::ImageUpload;
use crate::services::nearby_search::{QueryPoint, DEFAULT_LIMIT, DEFAULT_RADIUS_KM};
use crate::services::reaction_service::{self, Reaction, ReactionToggleView};
use crate::services::trash_can_service::{
    self, CreatedTrashCanView, NearbyQuery, NearbyTrashCan, TrashCanDetailView, TrashCanForm,
    UpdatedTrashCanView,
};
use crate::state::AppState;
use crate::web::middleware::auth::AuthenticatedUser;
use crate::web::response::{self, ApiResponse};

/// Raw query string values; parsing happens in [`parse_nearby_params`].
#[derive(Debug, Default, Deserialize)]
pub struct NearbyParams {
    lat: Option<String>,
    lng: Option<String>,
    radius: Option<String>,
    limit: Option<String>,
}

pub async fn nearby_handler(
    State(state): State<AppState>,
    Query(params): Query<NearbyParams>,
) -> AppResult<Json<ApiResponse<Vec<NearbyTrashCan>>>> {
    let query = parse_nearby_params(&params)?;
    let list = trash_can_service::find_nearby(&state.pool, query).await?;
    Ok(response::ok_with_data(list))
}

pub async fn detail_handler(
    State(state): State<AppState>,
    viewer: Option<Extension<AuthenticatedUser>>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<TrashCanDetailView>>> {
    let id = parse_id(&id)?;
    let viewer_id = viewer.map(|Extension(user)| user.id);
    let view = trash_can_service::load_detail(&state.pool, id, viewer_id).await?;
    Ok(response::ok_with_data(view))
}

pub async fn create_handler(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<ApiResponse<CreatedTrashCanView>>> {
    let form = read_trash_can_form(multipart).await?;
    let view = trash_can_service::create_trash_can(
        &state.pool,
        &state.connections,
        &state.config.upload_image_dir,
        auth_user.id,
        form,
    )
    .await?;
    Ok(response::ok_with_detailed(view, "trash can created"))
}

pub async fn update_handler(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<ApiResponse<UpdatedTrashCanView>>> {
    let id = parse_id(&id)?;
    let form = read_trash_can_form(multipart).await?;
    let view = trash_can_service::update_trash_can(
        &state.pool,
        &state.config.upload_image_dir,
        auth_user.id,
        id,
        form,
    )
    .await?;
    Ok(response::ok_with_detailed(view, "trash can updated"))
}

pub async fn delete_handler(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    let id = parse_id(&id)?;
    trash_can_service::delete_trash_can(&state.pool, &state.connections, auth_user.id, id).await?;
    Ok(response::ok_with_message("trash can deleted"))
}

pub async fn like_handler(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<ReactionToggleView>>> {
    react(&state, &auth_user, &id, Reaction::Like).await
}

pub async fn dislike_handler(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<ReactionToggleView>>> {
    react(&state, &auth_user, &id, Reaction::Dislike).await
}

async fn react(
    state: &AppState,
    auth_user: &AuthenticatedUser,
    raw_id: &str,
    reaction: Reaction,
) -> AppResult<Json<ApiResponse<ReactionToggleView>>> {
    let id = parse_id(raw_id)?;
    let view = reaction_service::toggle_reaction(&state.pool, auth_user.id, id, reaction).await?;
    Ok(response::ok_with_data(view))
}

/// `lat`/`lng` are required. A `radius` or `limit` that does not parse
/// becomes 0 rather than an error, and a negative radius is treated as 0.
fn parse_nearby_params(params: &NearbyParams) -> AppResult<NearbyQuery> {
    let latitude = required_float(params.lat.as_deref())?;
    let longitude = required_float(params.lng.as_deref())?;

    let radius_km = match params.radius.as_deref() {
        Some(raw) => raw.trim().parse::<f64>().unwrap_or(0.0).max(0.0),
        None => DEFAULT_RADIUS_KM,
    };
    let limit = match params.limit.as_deref() {
        Some(raw) => raw.trim().parse::<i64>().unwrap_or(0),
        None => DEFAULT_LIMIT,
    };

    Ok(NearbyQuery {
        origin: QueryPoint::new(latitude, longitude),
        radius_km,
        limit,
    })
}

/// NaN and infinities count as invalid, not as "matches nothing".
fn required_float(raw: Option<&str>) -> AppResult<f64> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .ok_or_else(AppError::param)
}

/// Ids are unsigned 32-bit on the wire.
fn parse_id(raw: &str) -> AppResult<i64> {
    raw.trim()
        .parse::<u32>()
        .map(i64::from)
        .map_err(|_| AppError::Param("invalid id".to_string()))
}

async fn read_trash_can_form(
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<TrashCanForm> {
    let mut multipart = multipart.map_err(|e| {
        warn!("multipart body rejected: {}", e);
        AppError::param()
    })?;

    let mut form = TrashCanForm::default();
    while let Some(field) = multipart.next_field().await.map_err(upload_error)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match name.as_str() {
            "image" => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(upload_error)?;
                // Browsers send an empty, unnamed part when no file was picked.
                if file_name.as_deref().map_or(true, str::is_empty) {
                    continue;
                }
                form.image = Some(ImageUpload {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            "latitude" => form.latitude = Some(field.text().await.map_err(upload_error)?),
            "longitude" => form.longitude = Some(field.text().await.map_err(upload_error)?),
            "address" => form.address = Some(field.text().await.map_err(upload_error)?),
            "description" => form.description = Some(field.text().await.map_err(upload_error)?),
            _ => {}
        }
    }
    Ok(form)
}

fn upload_error(e: MultipartError) -> AppError {
    AppError::Upload(e.body_text())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(lat: &str, lng: &str, radius: Option<&str>, limit: Option<&str>) -> NearbyParams {
        NearbyParams {
            lat: Some(lat.to_string()),
            lng: Some(lng.to_string()),
            radius: radius.map(str::to_string),
            limit: limit.map(str::to_string),
        }
    }

    #[test]
    fn defaults_apply_when_radius_and_limit_are_absent() {
        let q = parse_nearby_params(&params("31.1934", "121.4135", None, None)).unwrap();
        assert_eq!(q.origin.latitude, 31.1934);
        assert_eq!(q.origin.longitude, 121.4135);
        assert_eq!(q.radius_km, 5.0);
        assert_eq!(q.limit, 10);
    }

    #[test]
    fn explicit_values_are_used() {
        let q = parse_nearby_params(&params("0", "0", Some("2.5"), Some("3"))).unwrap();
        assert_eq!(q.radius_km, 2.5);
        assert_eq!(q.limit, 3);
    }

    #[test]
    fn unparsable_radius_and_limit_become_zero() {
        let q = parse_nearby_params(&params("1", "2", Some("far"), Some("lots"))).unwrap();
        assert_eq!(q.radius_km, 0.0);
        assert_eq!(q.limit, 0);
    }

    #[test]
    fn negative_radius_is_clamped() {
        let q = parse_nearby_params(&params("1", "2", Some("-4"), None)).unwrap();
        assert_eq!(q.radius_km, 0.0);
    }

    #[test]
    fn coordinates_are_required() {
        let missing = NearbyParams {
            lat: Some("31.2".to_string()),
            ..Default::default()
        };
        assert!(matches!(parse_nearby_params(&missing), Err(AppError::Param(_))));
        assert!(matches!(
            parse_nearby_params(&params("abc", "121.4", None, None)),
            Err(AppError::Param(_))
        ));
        assert!(matches!(
            parse_nearby_params(&params("", "121.4", None, None)),
            Err(AppError::Param(_))
        ));
    }

    #[test]
    fn non_finite_coordinates_are_rejected() {
        for bad in ["NaN", "nan", "inf", "-inf", "infinity"] {
            let lat_result = parse_nearby_params(&params(bad, "121.4", None, None));
            assert!(matches!(lat_result, Err(AppError::Param(_))), "lat={bad}");

            let lng_result = parse_nearby_params(&params("31.2", bad, None, None));
            assert!(matches!(lng_result, Err(AppError::Param(_))), "lng={bad}");
        }
    }

    #[test]
    fn ids_must_fit_u32() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert_eq!(parse_id("4294967295").unwrap(), 4_294_967_295);
        assert!(parse_id("4294967296").is_err());
        assert!(parse_id("-1").is_err());
        assert!(parse_id("abc").is_err());
    }
}
