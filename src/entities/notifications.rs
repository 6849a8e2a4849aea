use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// 系统通知 (事件本身，不含接收人)
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub game_id: Option<i64>,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::notification_receivers::Entity")]
    Receivers,
}

impl Related<super::notification_receivers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Receivers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
