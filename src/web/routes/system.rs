use axum::{http::StatusCode, response::IntoResponse, Json};

use crate::web::response::{self, ApiResponse};

pub async fn test_handler() -> Json<ApiResponse<()>> {
    response::ok_with_message("ok")
}

/// Unknown paths under `/api` answer in the JSON envelope instead of falling
/// through to the SPA.
pub async fn api_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::<()>::failure(response::NOT_FOUND, "API endpoint not found")),
    )
}
