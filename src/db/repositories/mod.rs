pub mod badge;
pub mod clan;
pub mod cms;
pub mod forum;
pub mod message;
pub mod notification;
pub mod ranking;
pub mod tournament;
pub mod user;

use anyhow::{Context, Result};
use sea_orm::{ConnectionTrait, EntityTrait, PaginatorTrait, Select, sea_query::LikeExpr};

use crate::domain::{PageParams, Paginated};

/// Runs the count and page queries for `select`.
pub(crate) async fn fetch_page<'db, C, E>(
    conn: &'db C,
    select: Select<E>,
    params: PageParams,
) -> Result<Paginated<E::Model>>
where
    C: ConnectionTrait,
    E: EntityTrait,
    E::Model: Send + Sync + 'db,
{
    let paginator = select.paginate(conn, params.limit);
    let total = paginator
        .num_items()
        .await
        .context("Failed to count rows")?;
    let items = paginator
        .fetch_page(params.page_index())
        .await
        .context("Failed to fetch page")?;

    Ok(Paginated::new(items, params, total))
}

/// Substring match with `%` and `_` in `term` taken literally.
pub(crate) fn contains_pattern(term: &str) -> LikeExpr {
    let escaped = term
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    LikeExpr::new(format!("%{escaped}%")).escape('\\')
}
