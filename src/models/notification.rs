use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{
    notification_entity as notifications, notification_receiver_entity as receivers,
};

use super::PaginatedResponse;

/// 固定的通知文案
pub struct NotificationText;

impl NotificationText {
    pub const DRAW_COMPLETED: &'static str =
        "The draw is complete! Check who you are giving a gift to.";
    pub const NEW_PARTICIPANT: &'static str = "A new participant has joined your game.";
}

/// 通知查询参数
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct NotificationQuery {
    /// 页码 (默认 1)
    pub page: Option<u32>,
    /// 每页数量 (默认 20)
    pub per_page: Option<u32>,
    /// 只返回未读
    #[serde(default)]
    pub unread_only: bool,
}

/// 收件箱中的一条通知
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NotificationResponse {
    /// 接收记录ID (标记已读时使用)
    pub id: i64,
    pub notification_id: i64,
    pub game_id: Option<i64>,
    pub text: String,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl NotificationResponse {
    pub fn new(receiver: receivers::Model, notification: notifications::Model) -> Self {
        NotificationResponse {
            id: receiver.id,
            notification_id: notification.id,
            game_id: notification.game_id,
            text: notification.text,
            is_read: receiver.is_read,
            read_at: receiver.read_at,
            created_at: notification.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UnreadCountResponse {
    pub unread: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MarkAllReadResponse {
    pub updated: u64,
}

/// 通知分页响应
pub type NotificationPageResponse = PaginatedResponse<NotificationResponse>;
