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
                    .table(CmsContent::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CmsContent::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CmsContent::ContentType).string().not_null())
                    .col(ColumnDef::new(CmsContent::Content).text().not_null())
                    .col(
                        ColumnDef::new(CmsContent::IsActive)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(CmsContent::IsPublished)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(CmsContent::PublishedAt).string().null())
                    .col(ColumnDef::new(CmsContent::UpdatedBy).integer().null())
                    .col(ColumnDef::new(CmsContent::CreatedAt).string().not_null())
                    .col(ColumnDef::new(CmsContent::UpdatedAt).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cms_content_updated_by")
                            .from(CmsContent::Table, CmsContent::UpdatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_cms_content_type_active")
                    .table(CmsContent::Table)
                    .col(CmsContent::ContentType)
                    .col(CmsContent::IsActive)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CmsContent::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum CmsContent {
    Table,
    Id,
    ContentType,
    Content,
    IsActive,
    IsPublished,
    PublishedAt,
    UpdatedBy,
    CreatedAt,
    UpdatedAt,
}
