use crate::entities::{
    notification_entity as notifications, notification_receiver_entity as receivers,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    NotificationPageResponse, NotificationQuery, NotificationResponse, PaginatedResponse,
    PaginationParams,
};
use chrono::{Duration, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use std::collections::HashSet;

#[derive(Clone)]
pub struct NotificationService {
    pool: DatabaseConnection,
}

impl NotificationService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 创建通知本身（不分配接收人）
    ///
    /// 接受任意连接，便于在调用方的事务中执行
    pub async fn create_notification<C: ConnectionTrait>(
        db: &C,
        game_id: Option<i64>,
        text: &str,
    ) -> Result<notifications::Model, DbErr> {
        notifications::ActiveModel {
            game_id: Set(game_id),
            text: Set(text.to_string()),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    /// 将通知分发给多个用户，每个用户一条未读接收记录
    /// 重复的 user_id 只保留第一次出现
    pub async fn broadcast<C: ConnectionTrait>(
        db: &C,
        notification: &notifications::Model,
        user_ids: &[i64],
    ) -> Result<Vec<receivers::Model>, DbErr> {
        let mut seen = HashSet::new();
        let mut created = Vec::with_capacity(user_ids.len());
        let now = Utc::now();

        for &user_id in user_ids.iter().filter(|id| seen.insert(**id)) {
            let receiver = receivers::ActiveModel {
                notification_id: Set(notification.id),
                user_id: Set(user_id),
                is_read: Set(false),
                read_at: Set(None),
                created_at: Set(now),
                ..Default::default()
            }
            .insert(db)
            .await?;
            created.push(receiver);
        }

        log::debug!(
            "Notification {} broadcast to {} users",
            notification.id,
            created.len()
        );
        Ok(created)
    }

    /// 获取用户收件箱（分页，新的在前）
    pub async fn list_notifications(
        &self,
        user_id: i64,
        query: &NotificationQuery,
    ) -> AppResult<NotificationPageResponse> {
        let params = PaginationParams::new(query.page, query.per_page);

        let mut base_query =
            receivers::Entity::find().filter(receivers::Column::UserId.eq(user_id));
        if query.unread_only {
            base_query = base_query.filter(receivers::Column::IsRead.eq(false));
        }

        let total = base_query.clone().count(&self.pool).await? as i64;

        let rows = base_query
            .find_also_related(notifications::Entity)
            .order_by_desc(receivers::Column::Id)
            .limit(params.get_limit() as u64)
            .offset(params.get_offset() as u64)
            .all(&self.pool)
            .await?;

        let items: Vec<NotificationResponse> = rows
            .into_iter()
            .filter_map(|(receiver, notification)| {
                notification.map(|n| NotificationResponse::new(receiver, n))
            })
            .collect();

        Ok(PaginatedResponse::new(
            items,
            params.get_page(),
            params.get_limit(),
            total,
        ))
    }

    /// 未读数量
    pub async fn unread_count(&self, user_id: i64) -> AppResult<u64> {
        let count = receivers::Entity::find()
            .filter(receivers::Column::UserId.eq(user_id))
            .filter(receivers::Column::IsRead.eq(false))
            .count(&self.pool)
            .await?;
        Ok(count)
    }

    /// 标记单条为已读；已读的再次标记不会改动 read_at
    pub async fn mark_as_read(
        &self,
        user_id: i64,
        receiver_id: i64,
    ) -> AppResult<NotificationResponse> {
        let (receiver, notification) = receivers::Entity::find_by_id(receiver_id)
            .filter(receivers::Column::UserId.eq(user_id))
            .find_also_related(notifications::Entity)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Notification not found".to_string()))?;
        let notification = notification
            .ok_or_else(|| AppError::NotFound("Notification not found".to_string()))?;

        let receiver = if receiver.is_read {
            receiver
        } else {
            let mut am = receiver.into_active_model();
            am.is_read = Set(true);
            am.read_at = Set(Some(Utc::now()));
            am.update(&self.pool).await?
        };

        Ok(NotificationResponse::new(receiver, notification))
    }

    /// 全部标记为已读，返回更新条数
    pub async fn mark_all_as_read(&self, user_id: i64) -> AppResult<u64> {
        let result = receivers::Entity::update_many()
            .col_expr(receivers::Column::IsRead, Expr::value(true))
            .col_expr(receivers::Column::ReadAt, Expr::value(Some(Utc::now())))
            .filter(receivers::Column::UserId.eq(user_id))
            .filter(receivers::Column::IsRead.eq(false))
            .exec(&self.pool)
            .await?;
        Ok(result.rows_affected)
    }

    /// 删除 read_at 早于 days_to_keep 天前的已读接收记录，返回删除条数
    pub async fn cleanup_old_notifications(&self, days_to_keep: i64) -> AppResult<u64> {
        let threshold = Utc::now() - Duration::days(days_to_keep);
        let result = receivers::Entity::delete_many()
            .filter(receivers::Column::IsRead.eq(true))
            .filter(receivers::Column::ReadAt.lt(threshold))
            .exec(&self.pool)
            .await?;
        Ok(result.rows_affected)
    }
}
