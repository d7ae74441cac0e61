use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::error::AppResult;
use crate::services::user_service::{self, CurrentUserView, OwnedTrashCanPage};
use crate::state::AppState;
use crate::web::middleware::auth::AuthenticatedUser;
use crate::web::response::{self, ApiResponse};

#[derive(Deserialize)]
pub struct PageParams {
    page: Option<String>,
    page_size: Option<String>,
}

pub async fn me_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<CurrentUserView>>> {
    let view = user_service::load_current_user(&state.pool, auth_user.id).await?;
    Ok(response::ok_with_data(view))
}

pub async fn my_trash_cans_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<ApiResponse<OwnedTrashCanPage>>> {
    let (page, page_size) =
        user_service::normalize_paging(params.page.as_deref(), params.page_size.as_deref());
    let view =
        user_service::list_owned_trash_cans(&state.pool, auth_user.id, page, page_size).await?;
    Ok(response::ok_with_data(view))
}
