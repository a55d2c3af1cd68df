use sea_orm::{ConnectionTrait, Statement};
use sea_orm_migration::prelude::*;

/// Lottery rounds (one row per weekly round, archived rows are kept for statistics)
#[derive(DeriveIden)]
enum LotteryRounds {
    Table,
    Id,
    Name,
    PoolSize,
    IsActive,
    IsLocked,
    CreatedAt,
}

/// Numbered tickets belonging to exactly one round
#[derive(DeriveIden)]
enum Tickets {
    Table,
    Id,
    RoundId,
    Number,
    OwnerName,
    IsTaken,
    HasWon,
    ClaimedAt,
    WonAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LotteryRounds::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LotteryRounds::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LotteryRounds::Name).string_len(100).not_null())
                    .col(ColumnDef::new(LotteryRounds::PoolSize).integer().not_null())
                    .col(
                        ColumnDef::new(LotteryRounds::IsActive)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(LotteryRounds::IsLocked)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(LotteryRounds::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // At most one active round; SeaQuery has no WHERE on index so use a raw statement
        let stmt = Statement::from_string(
            manager.get_database_backend(),
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_lottery_rounds_single_active ON lottery_rounds (is_active) WHERE is_active".to_owned(),
        );
        manager.get_connection().execute(stmt).await?;

        manager
            .create_table(
                Table::create()
                    .table(Tickets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tickets::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Tickets::RoundId).integer().not_null())
                    .col(ColumnDef::new(Tickets::Number).integer().not_null())
                    .col(ColumnDef::new(Tickets::OwnerName).string_len(50).null())
                    .col(
                        ColumnDef::new(Tickets::IsTaken)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Tickets::HasWon)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Tickets::ClaimedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(Tickets::WonAt).timestamp_with_time_zone().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tickets_round_id")
                            .from(Tickets::Table, Tickets::RoundId)
                            .to(LotteryRounds::Table, LotteryRounds::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        // number is unique inside its round
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tickets_round_number_unique")
                    .table(Tickets::Table)
                    .col(Tickets::RoundId)
                    .col(Tickets::Number)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // statistics scan won tickets across all rounds
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tickets_has_won")
                    .table(Tickets::Table)
                    .col(Tickets::HasWon)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Tickets::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LotteryRounds::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}
