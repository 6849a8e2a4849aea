use crate::config::DrawConfig;
use crate::entities::{
    DrawStatus, draw_assignment_entity as assignments, draw_entity as draws,
    game_entity as games, participant_entity as participants, user_entity as users,
};
use crate::error::{AppError, AppResult};
use crate::models::{AssignmentResponse, DrawResponse, DrawSummaryResponse, NotificationText};
use crate::services::{NotificationService, ParticipantService};
use crate::utils::{MIN_PARTICIPANTS, generate_assignments_with};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::collections::HashMap;

#[derive(Clone)]
pub struct DrawService {
    pool: DatabaseConnection,
    config: DrawConfig,
}

impl DrawService {
    pub fn new(pool: DatabaseConnection, config: DrawConfig) -> Self {
        Self { pool, config }
    }

    /// 发起抽签（使用系统熵初始化随机源）
    pub async fn start_draw(&self, organizer_id: i64, game_id: i64) -> AppResult<DrawResponse> {
        let mut rng = StdRng::from_entropy();
        self.start_draw_with_rng(organizer_id, game_id, &mut rng).await
    }

    /// 使用给定随机源发起抽签
    pub async fn start_draw_with_rng<R>(
        &self,
        organizer_id: i64,
        game_id: i64,
        rng: &mut R,
    ) -> AppResult<DrawResponse>
    where
        R: Rng + ?Sized,
    {
        self.start_draw_with_shuffle(organizer_id, game_id, |receivers: &mut [i64]| {
            receivers.shuffle(&mut *rng)
        })
        .await
    }

    /// 发起抽签，洗牌逻辑由调用方提供
    ///
    /// 逻辑 (单个事务，任一步失败整体回滚):
    /// 1. 校验组织者、游戏、权限、参与人数 (>= 3)
    /// 2. 按配置检查是否已抽过签
    /// 3. 写入抽签记录 (pending)
    /// 4. 随机生成分配，写入分配记录并更新每个参与者的 assigned_to_id
    /// 5. 抽签记录置为 completed，向所有送礼人发送通知
    pub async fn start_draw_with_shuffle<F>(
        &self,
        organizer_id: i64,
        game_id: i64,
        shuffle: F,
    ) -> AppResult<DrawResponse>
    where
        F: FnMut(&mut [i64]),
    {
        log::info!("Starting draw for game {game_id} by user {organizer_id}");

        let txn = self.pool.begin().await?;

        match self.run_draw(&txn, organizer_id, game_id, shuffle).await {
            Ok(draw) => {
                txn.commit().await?;
                log::info!(
                    "Draw {} completed for game {game_id} with {} assignments",
                    draw.id,
                    draw.assignments.len()
                );
                Ok(draw)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    log::error!("Failed to roll back draw for game {game_id}: {rollback_err}");
                }
                log::warn!("Draw for game {game_id} rolled back: {e}");
                Err(e)
            }
        }
    }

    /// 获取一次抽签的完整结果（仅组织者）
    pub async fn get_draw(&self, organizer_id: i64, draw_id: i64) -> AppResult<DrawResponse> {
        let draw = draws::Entity::find_by_id(draw_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Draw not found".to_string()))?;

        let game = games::Entity::find_by_id(draw.game_id)
            .filter(games::Column::IsDeleted.eq(false))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Game not found".to_string()))?;
        if game.organizer_id != organizer_id {
            return Err(AppError::PermissionDenied);
        }

        let items = assignments::Entity::find()
            .filter(assignments::Column::DrawId.eq(draw.id))
            .order_by_asc(assignments::Column::Id)
            .all(&self.pool)
            .await?;

        Ok(DrawResponse::new(
            draw,
            items.into_iter().map(Into::into).collect(),
        ))
    }

    /// 游戏的抽签历史（新的在前，仅组织者）
    pub async fn list_draws(
        &self,
        organizer_id: i64,
        game_id: i64,
    ) -> AppResult<Vec<DrawSummaryResponse>> {
        let game = games::Entity::find_by_id(game_id)
            .filter(games::Column::IsDeleted.eq(false))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Game not found".to_string()))?;
        if game.organizer_id != organizer_id {
            return Err(AppError::PermissionDenied);
        }

        let list = draws::Entity::find()
            .filter(draws::Column::GameId.eq(game.id))
            .order_by_desc(draws::Column::CreatedAt)
            .order_by_desc(draws::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(Into::into).collect())
    }

    // -----------------------------
    // 内部辅助方法
    // -----------------------------

    async fn run_draw<F>(
        &self,
        txn: &DatabaseTransaction,
        organizer_id: i64,
        game_id: i64,
        shuffle: F,
    ) -> AppResult<DrawResponse>
    where
        F: FnMut(&mut [i64]),
    {
        let organizer = users::Entity::find_by_id(organizer_id)
            .one(txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Organizer not found".to_string()))?;

        // 锁住游戏行，同一游戏的并发抽签在此串行化 (SQLite 下为空操作)
        let game = games::Entity::find_by_id(game_id)
            .filter(games::Column::IsDeleted.eq(false))
            .lock_exclusive()
            .one(txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Game not found".to_string()))?;

        if game.organizer_id != organizer.id {
            return Err(AppError::PermissionDenied);
        }

        let roster = ParticipantService::participants_in_enrollment_order(txn, game.id).await?;
        if roster.len() < MIN_PARTICIPANTS {
            return Err(AppError::PreconditionFailed(format!(
                "At least {MIN_PARTICIPANTS} participants are required for a draw, got {}",
                roster.len()
            )));
        }

        if !self.config.allow_redraw {
            let existing = draws::Entity::find()
                .filter(draws::Column::GameId.eq(game.id))
                .count(txn)
                .await?;
            if existing > 0 {
                return Err(AppError::PreconditionFailed(
                    "The draw for this game has already been held".to_string(),
                ));
            }
        }

        let draw = draws::ActiveModel {
            game_id: Set(game.id),
            status: Set(DrawStatus::Pending),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(txn)
        .await?;

        let ids: Vec<i64> = roster.iter().map(|p| p.id).collect();
        let pairs = generate_assignments_with(&ids, self.config.max_attempts, shuffle)?;

        // 参与者 id -> 用户 id
        let owners: HashMap<i64, i64> = roster.iter().map(|p| (p.id, p.user_id)).collect();

        let mut created = Vec::with_capacity(pairs.len());
        let mut giver_user_ids = Vec::with_capacity(pairs.len());
        for &(giver, receiver) in &pairs {
            participants::Entity::update_many()
                .col_expr(participants::Column::AssignedToId, Expr::value(receiver))
                .filter(participants::Column::Id.eq(giver))
                .exec(txn)
                .await?;

            let assignment = assignments::ActiveModel {
                draw_id: Set(draw.id),
                giver_id: Set(giver),
                receiver_id: Set(receiver),
                ..Default::default()
            }
            .insert(txn)
            .await?;
            created.push(AssignmentResponse::from(assignment));

            let user_id = owners.get(&giver).copied().ok_or_else(|| {
                AppError::InternalError(format!("Participant {giver} missing from roster"))
            })?;
            giver_user_ids.push(user_id);
        }

        let mut am = draw.into_active_model();
        am.status = Set(DrawStatus::Completed);
        let draw = am.update(txn).await?;

        let notification = NotificationService::create_notification(
            txn,
            Some(game.id),
            NotificationText::DRAW_COMPLETED,
        )
        .await?;
        NotificationService::broadcast(txn, &notification, &giver_user_ids).await?;

        Ok(DrawResponse::new(draw, created))
    }
}
