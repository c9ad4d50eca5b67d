//! Landing-page content: draft storage, publishing and the default fallback.

use serde::Serialize;
use thiserror::Error;

use crate::domain::cms::SectionError;
use crate::domain::{CmsContentType, Section};

/// Content of one page as served to readers or editors.
#[derive(Debug, Clone, Serialize)]
pub struct CmsView {
    pub content_type: CmsContentType,
    pub sections: Vec<Section>,
    /// True when no stored row applies and the built-in sections are served.
    pub is_default: bool,
    pub is_published: bool,
    pub published_at: Option<String>,
    pub updated_at: Option<String>,
    pub updated_by: Option<i32>,
}

#[derive(Debug, Error)]
pub enum CmsError {
    #[error("No content to publish")]
    NothingToPublish,

    #[error(transparent)]
    InvalidSections(#[from] SectionError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for CmsError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for CmsError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[async_trait::async_trait]
pub trait CmsService: Send + Sync {
    /// Visitor view: the active row when published, else the defaults.
    /// Only enabled sections, in display order.
    async fn published(&self, content_type: CmsContentType) -> Result<CmsView, CmsError>;

    /// Editor view: the active row regardless of publish state, else the defaults.
    async fn editable(&self, content_type: CmsContentType) -> Result<CmsView, CmsError>;

    /// Stores `sections` as the active row and publishes it.
    async fn save(
        &self,
        content_type: CmsContentType,
        sections: Vec<Section>,
        user_id: i32,
    ) -> Result<CmsView, CmsError>;

    /// Re-publishes the active row.
    async fn publish(&self, content_type: CmsContentType, user_id: i32)
    -> Result<CmsView, CmsError>;

    /// Drops the active row so the defaults are served again.
    async fn reset(&self, content_type: CmsContentType) -> Result<CmsView, CmsError>;
}
