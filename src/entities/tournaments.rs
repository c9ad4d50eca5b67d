use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "tournaments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub game: String,
    pub format: String,
    pub max_participants: i32,
    pub prize_pool: Option<String>,
    /// One of `upcoming`, `active`, `completed`, `cancelled`.
    pub status: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub registration_deadline: Option<String>,
    pub organizer_id: i32,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::OrganizerId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Organizer,
    #[sea_orm(has_many = "super::tournament_participants::Entity")]
    Participants,
}

impl Related<super::tournament_participants::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Participants.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
