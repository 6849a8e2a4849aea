use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(20))")]
#[serde(rename_all = "snake_case")]
pub enum GiftStatus {
    #[sea_orm(string_value = "planned")]
    Planned,
    #[sea_orm(string_value = "not_sent")]
    NotSent,
    #[sea_orm(string_value = "sent")]
    Sent,
    #[sea_orm(string_value = "received")]
    Received,
}

/// 参与者实体 (一个用户在一个游戏中的报名记录)
/// 说明:
/// - id 与 user_id 是两套身份，抽签只使用参与者 id
/// - assigned_to_id 指向同一游戏中的另一个参与者 (本参与者要送礼的对象)，
///   抽签前为 NULL，只保存 id，通过查询解析
/// - (user_id, game_id) 唯一
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "participants")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub game_id: i64,
    pub assigned_to_id: Option<i64>,
    pub wishlist: Option<String>,
    pub gift_status: GiftStatus,
    pub joined_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
