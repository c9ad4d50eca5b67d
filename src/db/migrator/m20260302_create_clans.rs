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
                    .table(Clans::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Clans::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Clans::Name).string().not_null().unique_key())
                    .col(ColumnDef::new(Clans::Tag).string().not_null().unique_key())
                    .col(ColumnDef::new(Clans::Description).text().null())
                    .col(ColumnDef::new(Clans::LogoUrl).string().null())
                    .col(ColumnDef::new(Clans::OwnerId).integer().not_null())
                    .col(ColumnDef::new(Clans::Points).integer().not_null().default(0))
                    .col(ColumnDef::new(Clans::Wins).integer().not_null().default(0))
                    .col(ColumnDef::new(Clans::Losses).integer().not_null().default(0))
                    .col(ColumnDef::new(Clans::CreatedAt).string().not_null())
                    .col(ColumnDef::new(Clans::UpdatedAt).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_clans_owner_id")
                            .from(Clans::Table, Clans::OwnerId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // user_id is unique: one clan per user is enforced by the schema.
        manager
            .create_table(
                Table::create()
                    .table(ClanMembers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ClanMembers::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ClanMembers::ClanId).integer().not_null())
                    .col(
                        ColumnDef::new(ClanMembers::UserId)
                            .integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(ClanMembers::Role)
                            .string()
                            .not_null()
                            .default("member"),
                    )
                    .col(ColumnDef::new(ClanMembers::JoinedAt).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_clan_members_clan_id")
                            .from(ClanMembers::Table, ClanMembers::ClanId)
                            .to(Clans::Table, Clans::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_clan_members_user_id")
                            .from(ClanMembers::Table, ClanMembers::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_clan_members_clan_id")
                    .table(ClanMembers::Table)
                    .col(ClanMembers::ClanId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ClanMembers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Clans::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Clans {
    Table,
    Id,
    Name,
    Tag,
    Description,
    LogoUrl,
    OwnerId,
    Points,
    Wins,
    Losses,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ClanMembers {
    Table,
    Id,
    ClanId,
    UserId,
    Role,
    JoinedAt,
}
