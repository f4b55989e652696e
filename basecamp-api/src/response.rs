use axum::{http::StatusCode, Json};
use serde::Serialize;

/// Success envelope: `{"success": true, "data": ...}` or
/// `{"success": true, "message": ...}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, crate::error::AppError>;

pub type ApiCreated<T> = Result<(StatusCode, Json<ApiResponse<T>>), crate::error::AppError>;

pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        success: true,
        data: Some(data),
        message: None,
    })
}

pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<ApiResponse<T>>) {
    (StatusCode::CREATED, ok(data))
}

pub fn message(text: impl Into<String>) -> Json<ApiResponse<()>> {
    Json(ApiResponse {
        success: true,
        data: None,
        message: Some(text.into()),
    })
}
