//! 测试辅助：内存 SQLite + 真实迁移，以及常用的数据构造

use crate::entities::{
    GameStatus, GiftStatus, game_entity as games, participant_entity as participants,
    user_entity as users,
};
use chrono::Utc;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use std::sync::atomic::{AtomicU64, Ordering};

static SECRET_SEQ: AtomicU64 = AtomicU64::new(1);

/// 每次调用都是一个全新的库；内存库只存在于单个连接中，所以连接池固定为 1
pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

pub async fn create_user(db: &DatabaseConnection, username: &str) -> users::Model {
    users::ActiveModel {
        username: Set(username.to_string()),
        email: Set(format!("{username}@example.com")),
        is_active: Set(true),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn create_game(
    db: &DatabaseConnection,
    organizer_id: i64,
    is_private: bool,
) -> games::Model {
    let seq = SECRET_SEQ.fetch_add(1, Ordering::Relaxed);
    games::ActiveModel {
        title: Set(format!("Office party #{seq}")),
        status: Set(GameStatus::Active),
        secret_key: Set(format!("K{seq:09}")),
        organizer_id: Set(organizer_id),
        is_private: Set(is_private),
        is_deleted: Set(false),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn enroll(db: &DatabaseConnection, user_id: i64, game_id: i64) -> participants::Model {
    participants::ActiveModel {
        user_id: Set(user_id),
        game_id: Set(game_id),
        assigned_to_id: Set(None),
        wishlist: Set(Some(format!("wishlist of user {user_id}"))),
        gift_status: Set(GiftStatus::NotSent),
        joined_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}
