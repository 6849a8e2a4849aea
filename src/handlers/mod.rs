pub mod draw;
pub mod notification;
pub mod participant;

pub use draw::draw_config;
pub use notification::notification_config;
pub use participant::participant_config;

use crate::error::{AppError, AppResult};
use actix_web::{HttpMessage, HttpRequest};

/// 从请求扩展中获取用户ID（中间件在鉴权后注入）
pub(crate) fn get_user_id_from_request(req: &HttpRequest) -> AppResult<i64> {
    req.extensions()
        .get::<i64>()
        .copied()
        .ok_or_else(|| AppError::AuthError("Missing authenticated user".to_string()))
}
