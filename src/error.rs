use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::web::response::{self, ApiResponse};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Param(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Upload(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn param() -> Self {
        AppError::Param("invalid parameters".to_string())
    }

    pub fn unauthorized() -> Self {
        AppError::Unauthorized("unauthorized, please log in".to_string())
    }

    pub fn status_and_code(&self) -> (StatusCode, i32) {
        match self {
            AppError::Param(_) | AppError::Upload(_) => {
                (StatusCode::BAD_REQUEST, response::PARAM_ERROR)
            }
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, response::AUTHORITY_ERROR),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, response::NOT_FOUND),
            AppError::Conflict(_) => (StatusCode::CONFLICT, response::CONFLICT),
            AppError::Database(_) | AppError::Io(_) | AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, response::ERROR)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let msg = match &self {
            AppError::Database(_) | AppError::Io(_) | AppError::Internal(_) => {
                error!("request failed: {}", self);
                "operation failed".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(ApiResponse::<()>::failure(code, msg))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
