//! `{ code, data, msg }` envelope shared by every `/api` response.

use axum::Json;
use serde::Serialize;

pub const SUCCESS: i32 = 2000;
pub const PARAM_ERROR: i32 = 4000;
pub const AUTHORITY_ERROR: i32 = 4001;
pub const NOT_FOUND: i32 = 4004;
pub const CONFLICT: i32 = 4009;
pub const ERROR: i32 = 5000;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub data: Option<T>,
    pub msg: String,
}

impl<T> ApiResponse<T> {
    pub fn failure(code: i32, msg: impl Into<String>) -> Self {
        Self {
            code,
            data: None,
            msg: msg.into(),
        }
    }
}

pub fn ok_with_data<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    ok_with_detailed(data, "success")
}

pub fn ok_with_detailed<T: Serialize>(data: T, msg: &str) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        code: SUCCESS,
        data: Some(data),
        msg: msg.to_string(),
    })
}

pub fn ok_with_message(msg: &str) -> Json<ApiResponse<()>> {
    Json(ApiResponse {
        code: SUCCESS,
        data: None,
        msg: msg.to_string(),
    })
}
