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
                    .table(ForumPosts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ForumPosts::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ForumPosts::Title).string().not_null())
                    .col(ColumnDef::new(ForumPosts::Content).text().not_null())
                    .col(
                        ColumnDef::new(ForumPosts::Category)
                            .string()
                            .not_null()
                            .default("general"),
                    )
                    .col(
                        ColumnDef::new(ForumPosts::Tags)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(ColumnDef::new(ForumPosts::AuthorId).integer().not_null())
                    .col(ColumnDef::new(ForumPosts::Views).integer().not_null().default(0))
                    .col(
                        ColumnDef::new(ForumPosts::IsPinned)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(ForumPosts::CreatedAt).string().not_null())
                    .col(ColumnDef::new(ForumPosts::UpdatedAt).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_forum_posts_author_id")
                            .from(ForumPosts::Table, ForumPosts::AuthorId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ForumComments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ForumComments::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ForumComments::PostId).integer().not_null())
                    .col(ColumnDef::new(ForumComments::AuthorId).integer().not_null())
                    .col(ColumnDef::new(ForumComments::Content).text().not_null())
                    .col(ColumnDef::new(ForumComments::CreatedAt).string().not_null())
                    .col(ColumnDef::new(ForumComments::UpdatedAt).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_forum_comments_post_id")
                            .from(ForumComments::Table, ForumComments::PostId)
                            .to(ForumPosts::Table, ForumPosts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_forum_comments_author_id")
                            .from(ForumComments::Table, ForumComments::AuthorId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ForumLikes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ForumLikes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ForumLikes::PostId).integer().not_null())
                    .col(ColumnDef::new(ForumLikes::UserId).integer().not_null())
                    .col(ColumnDef::new(ForumLikes::CreatedAt).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_forum_likes_post_id")
                            .from(ForumLikes::Table, ForumLikes::PostId)
                            .to(ForumPosts::Table, ForumPosts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_forum_likes_user_id")
                            .from(ForumLikes::Table, ForumLikes::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_forum_likes_unique")
                    .table(ForumLikes::Table)
                    .col(ForumLikes::PostId)
                    .col(ForumLikes::UserId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_forum_comments_post_id")
                    .table(ForumComments::Table)
                    .col(ForumComments::PostId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ForumLikes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ForumComments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ForumPosts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum ForumPosts {
    Table,
    Id,
    Title,
    Content,
    Category,
    Tags,
    AuthorId,
    Views,
    IsPinned,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ForumComments {
    Table,
    Id,
    PostId,
    AuthorId,
    Content,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ForumLikes {
    Table,
    Id,
    PostId,
    UserId,
    CreatedAt,
}
