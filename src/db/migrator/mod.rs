use sea_orm_migration::prelude::*;

mod m20260301_create_users;
mod m20260302_create_clans;
mod m20260303_create_tournaments;
mod m20260304_create_forum;
mod m20260305_create_badges;
mod m20260306_create_messaging;
mod m20260307_create_cms_content;
mod m20260312_normalize_legacy_json;
mod m20260313_cms_single_active;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_create_users::Migration),
            Box::new(m20260302_create_clans::Migration),
            Box::new(m20260303_create_tournaments::Migration),
            Box::new(m20260304_create_forum::Migration),
            Box::new(m20260305_create_badges::Migration),
            Box::new(m20260306_create_messaging::Migration),
            Box::new(m20260307_create_cms_content::Migration),
            Box::new(m20260312_normalize_legacy_json::Migration),
            Box::new(m20260313_cms_single_active::Migration),
        ]
    }
}
