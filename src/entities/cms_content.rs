use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "cms_content")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Page key, e.g. `HOME_PAGE`.
    pub content_type: String,
    /// JSON-encoded section list.
    pub content: String,
    pub is_active: bool,
    pub is_published: bool,
    pub published_at: Option<String>,
    pub updated_by: Option<i32>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
