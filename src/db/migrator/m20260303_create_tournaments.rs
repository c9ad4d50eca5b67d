use sea_orm_migration::prelude::*;

use super::m20260301_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Tournaments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tournaments::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Tournaments::Title).string().not_null())
                    .col(ColumnDef::new(Tournaments::Description).text().null())
                    .col(ColumnDef::new(Tournaments::Game).string().not_null())
                    .col(ColumnDef::new(Tournaments::Format).string().not_null())
                    .col(
                        ColumnDef::new(Tournaments::MaxParticipants)
                            .integer()
                            .not_null()
                            .default(16),
                    )
                    .col(ColumnDef::new(Tournaments::PrizePool).string().null())
                    .col(
                        ColumnDef::new(Tournaments::Status)
                            .string()
                            .not_null()
                            .default("upcoming"),
                    )
                    .col(ColumnDef::new(Tournaments::StartDate).string().not_null())
                    .col(ColumnDef::new(Tournaments::EndDate).string().null())
                    .col(
                        ColumnDef::new(Tournaments::RegistrationDeadline)
                            .string()
                            .null(),
                    )
                    .col(ColumnDef::new(Tournaments::OrganizerId).integer().not_null())
                    .col(ColumnDef::new(Tournaments::CreatedAt).string().not_null())
                    .col(ColumnDef::new(Tournaments::UpdatedAt).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tournaments_organizer_id")
                            .from(Tournaments::Table, Tournaments::OrganizerId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TournamentParticipants::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TournamentParticipants::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TournamentParticipants::TournamentId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TournamentParticipants::UserId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TournamentParticipants::JoinedAt)
                            .string()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tournament_participants_tournament_id")
                            .from(
                                TournamentParticipants::Table,
                                TournamentParticipants::TournamentId,
                            )
                            .to(Tournaments::Table, Tournaments::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tournament_participants_user_id")
                            .from(TournamentParticipants::Table, TournamentParticipants::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tournament_participants_unique")
                    .table(TournamentParticipants::Table)
                    .col(TournamentParticipants::TournamentId)
                    .col(TournamentParticipants::UserId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TournamentParticipants::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tournaments::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Tournaments {
    Table,
    Id,
    Title,
    Description,
    Game,
    Format,
    MaxParticipants,
    PrizePool,
    Status,
    StartDate,
    EndDate,
    RegistrationDeadline,
    OrganizerId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum TournamentParticipants {
    Table,
    Id,
    TournamentId,
    UserId,
    JoinedAt,
}
