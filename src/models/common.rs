use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 错误响应体中的 error 字段
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

/// 统一错误响应 `{"success": false, "error": {...}}`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    pub success: bool,
    pub error: ApiError,
}
