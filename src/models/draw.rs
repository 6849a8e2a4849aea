use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{DrawStatus, draw_assignment_entity as assignments, draw_entity as draws};

/// 抽签结果中的一条分配
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AssignmentResponse {
    /// 送礼参与者ID
    pub giver_participant_id: i64,
    /// 收礼参与者ID
    pub receiver_participant_id: i64,
}

impl From<assignments::Model> for AssignmentResponse {
    fn from(m: assignments::Model) -> Self {
        AssignmentResponse {
            giver_participant_id: m.giver_id,
            receiver_participant_id: m.receiver_id,
        }
    }
}

/// 抽签详情（含全部分配，按写入顺序）
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DrawResponse {
    pub id: i64,
    pub game_id: i64,
    pub status: DrawStatus,
    pub created_at: DateTime<Utc>,
    pub assignments: Vec<AssignmentResponse>,
}

impl DrawResponse {
    pub fn new(draw: draws::Model, assignments: Vec<AssignmentResponse>) -> Self {
        DrawResponse {
            id: draw.id,
            game_id: draw.game_id,
            status: draw.status,
            created_at: draw.created_at,
            assignments,
        }
    }
}

/// 抽签列表项（不含分配）
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DrawSummaryResponse {
    pub id: i64,
    pub game_id: i64,
    pub status: DrawStatus,
    pub created_at: DateTime<Utc>,
}

impl From<draws::Model> for DrawSummaryResponse {
    fn from(m: draws::Model) -> Self {
        DrawSummaryResponse {
            id: m.id,
            game_id: m.game_id,
            status: m.status,
            created_at: m.created_at,
        }
    }
}
