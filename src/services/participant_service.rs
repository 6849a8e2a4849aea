use crate::entities::{
    GiftStatus, draw_entity as draws, game_entity as games, participant_entity as participants,
    user_entity as users,
};
use crate::error::{AppError, AppResult};
use crate::models::{NotificationText, ParticipantResponse, RecipientResponse};
use crate::services::NotificationService;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

#[derive(Clone)]
pub struct ParticipantService {
    pool: DatabaseConnection,
}

impl ParticipantService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 按报名顺序 (joined_at, id) 获取游戏的全部参与者
    pub async fn participants_in_enrollment_order<C: ConnectionTrait>(
        db: &C,
        game_id: i64,
    ) -> Result<Vec<participants::Model>, DbErr> {
        participants::Entity::find()
            .filter(participants::Column::GameId.eq(game_id))
            .order_by_asc(participants::Column::JoinedAt)
            .order_by_asc(participants::Column::Id)
            .all(db)
            .await
    }

    /// 通过秘钥加入公开游戏，并通知组织者
    ///
    /// 私密游戏需要走加入申请流程，不在这里处理；已抽签的游戏不再接受报名
    pub async fn join_game(
        &self,
        user_id: i64,
        secret_key: &str,
    ) -> AppResult<ParticipantResponse> {
        let secret_key = secret_key.trim();
        if secret_key.is_empty() {
            return Err(AppError::ValidationError("Secret key is required".to_string()));
        }

        let txn = self.pool.begin().await?;

        users::Entity::find_by_id(user_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let game = games::Entity::find()
            .filter(games::Column::SecretKey.eq(secret_key))
            .filter(games::Column::IsDeleted.eq(false))
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Game not found".to_string()))?;

        if game.is_private {
            return Err(AppError::PermissionDenied);
        }

        let draw_count = draws::Entity::find()
            .filter(draws::Column::GameId.eq(game.id))
            .count(&txn)
            .await?;
        if draw_count > 0 {
            return Err(AppError::PreconditionFailed(
                "The draw for this game has already been held".to_string(),
            ));
        }

        let existing = participants::Entity::find()
            .filter(participants::Column::UserId.eq(user_id))
            .filter(participants::Column::GameId.eq(game.id))
            .one(&txn)
            .await?;
        if existing.is_some() {
            return Err(AppError::ValidationError(
                "Already participating in this game".to_string(),
            ));
        }

        let participant = participants::ActiveModel {
            user_id: Set(user_id),
            game_id: Set(game.id),
            assigned_to_id: Set(None),
            wishlist: Set(None),
            gift_status: Set(GiftStatus::NotSent),
            joined_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let notification = NotificationService::create_notification(
            &txn,
            Some(game.id),
            NotificationText::NEW_PARTICIPANT,
        )
        .await?;
        NotificationService::broadcast(&txn, &notification, &[game.organizer_id]).await?;

        txn.commit().await?;

        log::info!(
            "User {user_id} joined game {} as participant {}",
            game.id,
            participant.id
        );
        Ok(participant.into())
    }

    /// 获取游戏参与者列表（仅组织者或参与者可见）
    ///
    /// 只有组织者能看到全部分配，参与者只能看到自己的 assigned_to_id
    pub async fn list_participants(
        &self,
        requester_id: i64,
        game_id: i64,
    ) -> AppResult<Vec<ParticipantResponse>> {
        let game = self.find_active_game(game_id).await?;
        let list = Self::participants_in_enrollment_order(&self.pool, game.id).await?;

        let is_member =
            game.organizer_id == requester_id || list.iter().any(|p| p.user_id == requester_id);
        if !is_member {
            // 不向非成员暴露游戏是否存在
            return Err(AppError::NotFound("Game not found".to_string()));
        }

        let is_organizer = game.organizer_id == requester_id;
        Ok(list
            .into_iter()
            .map(|p| {
                let own = p.user_id == requester_id;
                let mut item = ParticipantResponse::from(p);
                if !is_organizer && !own {
                    item.assigned_to_id = None;
                }
                item
            })
            .collect())
    }

    /// 当前用户在该游戏中的送礼对象
    pub async fn get_recipient(&self, user_id: i64, game_id: i64) -> AppResult<RecipientResponse> {
        let game = self.find_active_game(game_id).await?;

        let me = participants::Entity::find()
            .filter(participants::Column::UserId.eq(user_id))
            .filter(participants::Column::GameId.eq(game.id))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Not participating in this game".to_string()))?;

        let recipient_id = me.assigned_to_id.ok_or_else(|| {
            AppError::PreconditionFailed("The draw has not been held yet".to_string())
        })?;

        let (recipient, user) = participants::Entity::find_by_id(recipient_id)
            .find_also_related(users::Entity)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Recipient not found".to_string()))?;
        let user = user.ok_or_else(|| AppError::NotFound("Recipient not found".to_string()))?;

        Ok(RecipientResponse {
            participant_id: recipient.id,
            username: user.username,
            wishlist: recipient.wishlist,
        })
    }

    async fn find_active_game(&self, game_id: i64) -> AppResult<games::Model> {
        games::Entity::find_by_id(game_id)
            .filter(games::Column::IsDeleted.eq(false))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Game not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DrawConfig;
    use crate::entities::notification_receiver_entity as receivers;
    use crate::services::DrawService;
    use crate::test_support::{create_game, create_user, enroll, setup_db};
    use sea_orm::IntoActiveModel;

    #[tokio::test]
    async fn test_join_game_by_secret_key_notifies_organizer() {
        let db = setup_db().await;
        let service = ParticipantService::new(db.clone());
        let organizer = create_user(&db, "organizer").await;
        let alice = create_user(&db, "alice").await;
        let game = create_game(&db, organizer.id, false).await;

        let participant = service.join_game(alice.id, &game.secret_key).await.unwrap();
        assert_eq!(participant.user_id, alice.id);
        assert_eq!(participant.game_id, game.id);
        assert_eq!(participant.assigned_to_id, None);
        assert_eq!(participant.gift_status, GiftStatus::NotSent);

        let organizer_inbox = receivers::Entity::find()
            .filter(receivers::Column::UserId.eq(organizer.id))
            .count(&db)
            .await
            .unwrap();
        assert_eq!(organizer_inbox, 1);
    }

    #[tokio::test]
    async fn test_join_game_twice_is_rejected() {
        let db = setup_db().await;
        let service = ParticipantService::new(db.clone());
        let organizer = create_user(&db, "organizer").await;
        let alice = create_user(&db, "alice").await;
        let game = create_game(&db, organizer.id, false).await;

        service.join_game(alice.id, &game.secret_key).await.unwrap();
        let second = service.join_game(alice.id, &game.secret_key).await;
        assert!(matches!(second, Err(AppError::ValidationError(_))));

        let participants = ParticipantService::participants_in_enrollment_order(&db, game.id)
            .await
            .unwrap();
        assert_eq!(participants.len(), 1);
    }

    #[tokio::test]
    async fn test_join_private_or_unknown_game() {
        let db = setup_db().await;
        let service = ParticipantService::new(db.clone());
        let organizer = create_user(&db, "organizer").await;
        let alice = create_user(&db, "alice").await;
        let private_game = create_game(&db, organizer.id, true).await;

        assert!(matches!(
            service.join_game(alice.id, &private_game.secret_key).await,
            Err(AppError::PermissionDenied)
        ));
        assert!(matches!(
            service.join_game(alice.id, "NOPE").await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.join_game(9999, &private_game.secret_key).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_deleted_game_cannot_be_joined() {
        let db = setup_db().await;
        let service = ParticipantService::new(db.clone());
        let organizer = create_user(&db, "organizer").await;
        let alice = create_user(&db, "alice").await;
        let game = create_game(&db, organizer.id, false).await;

        let mut am = game.clone().into_active_model();
        am.is_deleted = Set(true);
        am.update(&db).await.unwrap();

        assert!(matches!(
            service.join_game(alice.id, &game.secret_key).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_enrollment_order_and_listing_visibility() {
        let db = setup_db().await;
        let service = ParticipantService::new(db.clone());
        let organizer = create_user(&db, "organizer").await;
        let alice = create_user(&db, "alice").await;
        let bob = create_user(&db, "bob").await;
        let outsider = create_user(&db, "outsider").await;
        let game = create_game(&db, organizer.id, false).await;

        let a = enroll(&db, alice.id, game.id).await;
        let b = enroll(&db, bob.id, game.id).await;

        let ordered = ParticipantService::participants_in_enrollment_order(&db, game.id)
            .await
            .unwrap();
        assert_eq!(
            ordered.iter().map(|p| p.id).collect::<Vec<_>>(),
            vec![a.id, b.id]
        );

        assert_eq!(service.list_participants(organizer.id, game.id).await.unwrap().len(), 2);
        assert_eq!(service.list_participants(bob.id, game.id).await.unwrap().len(), 2);
        assert!(matches!(
            service.list_participants(outsider.id, game.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_recipient_requires_a_completed_draw() {
        let db = setup_db().await;
        let service = ParticipantService::new(db.clone());
        let organizer = create_user(&db, "organizer").await;
        let alice = create_user(&db, "alice").await;
        let outsider = create_user(&db, "outsider").await;
        let game = create_game(&db, organizer.id, false).await;
        enroll(&db, alice.id, game.id).await;

        assert!(matches!(
            service.get_recipient(alice.id, game.id).await,
            Err(AppError::PreconditionFailed(_))
        ));
        assert!(matches!(
            service.get_recipient(outsider.id, game.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_members_only_see_their_own_assignment() {
        let db = setup_db().await;
        let service = ParticipantService::new(db.clone());
        let organizer = create_user(&db, "organizer").await;
        let game = create_game(&db, organizer.id, false).await;
        let mut members = Vec::new();
        for i in 0..4 {
            let user = create_user(&db, &format!("member{i}")).await;
            members.push(enroll(&db, user.id, game.id).await);
        }
        DrawService::new(db.clone(), DrawConfig::default())
            .start_draw(organizer.id, game.id)
            .await
            .unwrap();

        let me = &members[0];
        let seen = service.list_participants(me.user_id, game.id).await.unwrap();
        assert_eq!(seen.len(), 4);
        for item in &seen {
            if item.id == me.id {
                assert!(item.assigned_to_id.is_some());
            } else {
                assert_eq!(item.assigned_to_id, None, "participant {} leaked", item.id);
            }
        }

        // 组织者看到完整分配
        let full = service.list_participants(organizer.id, game.id).await.unwrap();
        assert!(full.iter().all(|p| p.assigned_to_id.is_some()));
    }

    #[tokio::test]
    async fn test_join_after_draw_is_rejected() {
        let db = setup_db().await;
        let service = ParticipantService::new(db.clone());
        let organizer = create_user(&db, "organizer").await;
        let game = create_game(&db, organizer.id, false).await;
        for i in 0..3 {
            let user = create_user(&db, &format!("member{i}")).await;
            enroll(&db, user.id, game.id).await;
        }
        DrawService::new(db.clone(), DrawConfig::default())
            .start_draw(organizer.id, game.id)
            .await
            .unwrap();

        let late = create_user(&db, "late").await;
        let result = service.join_game(late.id, &game.secret_key).await;
        assert!(matches!(result, Err(AppError::PreconditionFailed(_))), "{result:?}");

        let roster = ParticipantService::participants_in_enrollment_order(&db, game.id)
            .await
            .unwrap();
        assert_eq!(roster.len(), 3);
        assert!(roster.iter().all(|p| p.assigned_to_id.is_some()));
    }
}
