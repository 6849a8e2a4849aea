use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{GiftStatus, participant_entity as participants};

/// 通过秘钥加入游戏
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct JoinGameRequest {
    pub secret_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ParticipantResponse {
    pub id: i64,
    pub user_id: i64,
    pub game_id: i64,
    pub wishlist: Option<String>,
    pub gift_status: GiftStatus,
    /// 抽签后才有值
    pub assigned_to_id: Option<i64>,
    pub joined_at: DateTime<Utc>,
}

impl From<participants::Model> for ParticipantResponse {
    fn from(m: participants::Model) -> Self {
        ParticipantResponse {
            id: m.id,
            user_id: m.user_id,
            game_id: m.game_id,
            wishlist: m.wishlist,
            gift_status: m.gift_status,
            assigned_to_id: m.assigned_to_id,
            joined_at: m.joined_at,
        }
    }
}

/// 当前用户需要送礼的对象
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecipientResponse {
    pub participant_id: i64,
    pub username: String,
    pub wishlist: Option<String>,
}
