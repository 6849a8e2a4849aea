use sea_orm::entity::prelude::*;

/// 抽签结果中的一条边: giver 给 receiver 送礼
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "draw_assignments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub draw_id: i64,
    /// 送礼参与者 (participants.id)
    pub giver_id: i64,
    /// 收礼参与者 (participants.id)
    pub receiver_id: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::draws::Entity",
        from = "Column::DrawId",
        to = "super::draws::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Draw,
}

impl Related<super::draws::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Draw.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
