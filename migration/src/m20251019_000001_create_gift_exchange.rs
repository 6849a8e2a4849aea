use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    Email,
    IsActive,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Games {
    Table,
    Id,
    Title,
    Status,
    SecretKey,
    OrganizerId,
    IsPrivate,
    IsDeleted,
    CreatedAt,
}

/// 参与者 (User <-> Game)，assigned_to_id 指向同表中的收礼人
#[derive(DeriveIden)]
enum Participants {
    Table,
    Id,
    UserId,
    GameId,
    AssignedToId,
    Wishlist,
    GiftStatus,
    JoinedAt,
}

#[derive(DeriveIden)]
enum Draws {
    Table,
    Id,
    GameId,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
enum DrawAssignments {
    Table,
    Id,
    DrawId,
    GiverId,
    ReceiverId,
}

#[derive(DeriveIden)]
enum Notifications {
    Table,
    Id,
    GameId,
    Text,
    CreatedAt,
}

/// 通知接收记录：每个用户独立的已读/未读状态
#[derive(DeriveIden)]
enum NotificationReceivers {
    Table,
    Id,
    NotificationId,
    UserId,
    IsRead,
    ReadAt,
    CreatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

/// 外键全部内联在 CREATE TABLE 中，SQLite 不支持 ALTER TABLE ADD CONSTRAINT
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Username).string_len(100).not_null())
                    .col(
                        ColumnDef::new(Users::Email)
                            .string_len(100)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Users::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Games::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Games::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Games::Title).string_len(200).not_null())
                    .col(
                        ColumnDef::new(Games::Status)
                            .string_len(20)
                            .not_null()
                            .default("draft"),
                    )
                    .col(
                        ColumnDef::new(Games::SecretKey)
                            .string_len(10)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Games::OrganizerId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Games::IsPrivate)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Games::IsDeleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Games::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_games_organizer")
                            .from(Games::Table, Games::OrganizerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Participants::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Participants::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Participants::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Participants::GameId).big_integer().not_null())
                    .col(ColumnDef::new(Participants::AssignedToId).big_integer().null())
                    .col(ColumnDef::new(Participants::Wishlist).text().null())
                    .col(
                        ColumnDef::new(Participants::GiftStatus)
                            .string_len(20)
                            .not_null()
                            .default("not_sent"),
                    )
                    .col(
                        ColumnDef::new(Participants::JoinedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_participants_user")
                            .from(Participants::Table, Participants::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_participants_game")
                            .from(Participants::Table, Participants::GameId)
                            .to(Games::Table, Games::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_participants_assigned_to")
                            .from(Participants::Table, Participants::AssignedToId)
                            .to(Participants::Table, Participants::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // 同一用户在同一游戏中只能有一条参与记录
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_participant_user_game")
                    .table(Participants::Table)
                    .col(Participants::UserId)
                    .col(Participants::GameId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Draws::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Draws::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Draws::GameId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Draws::Status)
                            .string_len(20)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Draws::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_draws_game")
                            .from(Draws::Table, Draws::GameId)
                            .to(Games::Table, Games::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_draws_game_id")
                    .table(Draws::Table)
                    .col(Draws::GameId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DrawAssignments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DrawAssignments::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DrawAssignments::DrawId).big_integer().not_null())
                    .col(ColumnDef::new(DrawAssignments::GiverId).big_integer().not_null())
                    .col(
                        ColumnDef::new(DrawAssignments::ReceiverId)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_draw_assignments_draw")
                            .from(DrawAssignments::Table, DrawAssignments::DrawId)
                            .to(Draws::Table, Draws::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_draw_assignments_giver")
                            .from(DrawAssignments::Table, DrawAssignments::GiverId)
                            .to(Participants::Table, Participants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_draw_assignments_receiver")
                            .from(DrawAssignments::Table, DrawAssignments::ReceiverId)
                            .to(Participants::Table, Participants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_draw_assignments_draw_id")
                    .table(DrawAssignments::Table)
                    .col(DrawAssignments::DrawId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Notifications::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Notifications::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Notifications::GameId).big_integer().null())
                    .col(ColumnDef::new(Notifications::Text).text().not_null())
                    .col(
                        ColumnDef::new(Notifications::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notifications_game")
                            .from(Notifications::Table, Notifications::GameId)
                            .to(Games::Table, Games::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(NotificationReceivers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(NotificationReceivers::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(NotificationReceivers::NotificationId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(NotificationReceivers::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(NotificationReceivers::IsRead)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(NotificationReceivers::ReadAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(NotificationReceivers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notification_receivers_notification")
                            .from(
                                NotificationReceivers::Table,
                                NotificationReceivers::NotificationId,
                            )
                            .to(Notifications::Table, Notifications::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notification_receivers_user")
                            .from(NotificationReceivers::Table, NotificationReceivers::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_notification_receivers_notification_user")
                    .table(NotificationReceivers::Table)
                    .col(NotificationReceivers::NotificationId)
                    .col(NotificationReceivers::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 收件箱查询: WHERE user_id = ? [AND is_read = false]
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_notification_receivers_user_read")
                    .table(NotificationReceivers::Table)
                    .col(NotificationReceivers::UserId)
                    .col(NotificationReceivers::IsRead)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(NotificationReceivers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Notifications::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DrawAssignments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Draws::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Participants::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Games::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
