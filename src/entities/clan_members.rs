use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "clan_members")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub clan_id: i32,
    /// Unique: a user belongs to at most one clan.
    #[sea_orm(unique)]
    pub user_id: i32,
    /// One of `owner`, `leader`, `member`.
    pub role: String,
    pub joined_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::clans::Entity",
        from = "Column::ClanId",
        to = "super::clans::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Clan,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::clans::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Clan.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
