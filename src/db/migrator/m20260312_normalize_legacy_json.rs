use sea_orm::{ConnectionTrait, Statement};
use sea_orm_migration::prelude::*;

use crate::domain::{cms, forum};

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Rewrites text columns that predate the JSON encoding: CMS content saved as
/// raw markup and forum tags saved as comma separated lists.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();
        let backend = conn.get_database_backend();

        let rows = conn
            .query_all(Statement::from_string(
                backend,
                "SELECT id, content FROM cms_content",
            ))
            .await?;

        for row in rows {
            let id: i32 = row.try_get("", "id")?;
            let content: String = row.try_get("", "content")?;

            let decoded = cms::decode_sections(&content);
            if !decoded.legacy {
                continue;
            }

            conn.execute(Statement::from_sql_and_values(
                backend,
                "UPDATE cms_content SET content = ? WHERE id = ?",
                [cms::encode_sections(&decoded.sections).into(), id.into()],
            ))
            .await?;
        }

        let rows = conn
            .query_all(Statement::from_string(
                backend,
                "SELECT id, tags FROM forum_posts",
            ))
            .await?;

        for row in rows {
            let id: i32 = row.try_get("", "id")?;
            let tags: String = row.try_get("", "tags")?;

            if !forum::is_legacy_tags(&tags) {
                continue;
            }

            conn.execute(Statement::from_sql_and_values(
                backend,
                "UPDATE forum_posts SET tags = ? WHERE id = ?",
                [forum::encode_tags(&forum::decode_tags(&tags)).into(), id.into()],
            ))
            .await?;
        }

        Ok(())
    }

    async fn down(&self, _manager: &SchemaManager) -> Result<(), DbErr> {
        Ok(())
    }
}
