use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        // Keep only the newest active row per page before enforcing uniqueness.
        conn.execute_unprepared(
            "UPDATE cms_content SET is_active = 0 WHERE is_active = 1 AND id NOT IN \
             (SELECT MAX(id) FROM cms_content WHERE is_active = 1 GROUP BY content_type)",
        )
        .await?;

        conn.execute_unprepared("DROP INDEX IF EXISTS idx_cms_content_type_active")
            .await?;

        conn.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_cms_content_single_active \
             ON cms_content(content_type) WHERE is_active = 1",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        conn.execute_unprepared("DROP INDEX IF EXISTS idx_cms_content_single_active")
            .await?;

        conn.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_cms_content_type_active \
             ON cms_content(content_type, is_active)",
        )
        .await?;

        Ok(())
    }
}
