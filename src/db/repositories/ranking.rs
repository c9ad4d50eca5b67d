use anyhow::Result;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

use super::fetch_page;
use super::user::User;
use crate::domain::{PageParams, Paginated, UserStatus};
use crate::entities::{clans, users};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRankingSort {
    #[default]
    Points,
    Wins,
    Xp,
    Level,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClanRankingSort {
    #[default]
    Points,
    Wins,
}

pub struct RankingRepository {
    conn: DatabaseConnection,
}

impl RankingRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Active users ordered by the requested stat; ties break by id.
    pub async fn users(&self, sort: UserRankingSort, params: PageParams) -> Result<Paginated<User>> {
        let column = match sort {
            UserRankingSort::Points => users::Column::Points,
            UserRankingSort::Wins => users::Column::Wins,
            UserRankingSort::Xp => users::Column::Xp,
            UserRankingSort::Level => users::Column::Level,
        };

        let query = users::Entity::find()
            .filter(users::Column::Status.eq(UserStatus::Active.as_str()))
            .order_by_desc(column)
            .order_by_desc(users::Column::Points)
            .order_by_asc(users::Column::Id);

        Ok(fetch_page(&self.conn, query, params).await?.map(User::from))
    }

    pub async fn clans(
        &self,
        sort: ClanRankingSort,
        params: PageParams,
    ) -> Result<Paginated<clans::Model>> {
        let column = match sort {
            ClanRankingSort::Points => clans::Column::Points,
            ClanRankingSort::Wins => clans::Column::Wins,
        };

        let query = clans::Entity::find()
            .order_by_desc(column)
            .order_by_desc(clans::Column::Points)
            .order_by_asc(clans::Column::Id);

        fetch_page(&self.conn, query, params).await
    }
}
