//! `SeaORM` implementation of the `CmsService` trait.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::db::Store;
use crate::domain::cms::{
    decode_sections, default_home_sections, encode_sections, validate_sections, visible_sections,
};
use crate::domain::{CmsContentType, Section};
use crate::entities::cms_content;
use crate::services::cms_service::{CmsError, CmsService, CmsView};

pub struct SeaOrmCmsService {
    store: Store,
}

impl SeaOrmCmsService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    fn defaults(content_type: CmsContentType) -> CmsView {
        let sections = match content_type {
            CmsContentType::HomePage => default_home_sections(),
        };
        CmsView {
            content_type,
            sections,
            is_default: true,
            is_published: false,
            published_at: None,
            updated_at: None,
            updated_by: None,
        }
    }

    fn view(content_type: CmsContentType, row: cms_content::Model) -> CmsView {
        let decoded = decode_sections(&row.content);
        if decoded.legacy {
            warn!(
                cms_id = row.id,
                content_type = %content_type,
                "CMS content is not a section list, serving it as rich text"
            );
        }

        CmsView {
            content_type,
            sections: decoded.sections,
            is_default: false,
            is_published: row.is_published,
            published_at: row.published_at,
            updated_at: Some(row.updated_at),
            updated_by: row.updated_by,
        }
    }
}

#[async_trait]
impl CmsService for SeaOrmCmsService {
    async fn published(&self, content_type: CmsContentType) -> Result<CmsView, CmsError> {
        let mut view = match self.store.cms().active(content_type).await? {
            Some(row) if row.is_published => Self::view(content_type, row),
            _ => Self::defaults(content_type),
        };
        view.sections = visible_sections(view.sections);
        Ok(view)
    }

    async fn editable(&self, content_type: CmsContentType) -> Result<CmsView, CmsError> {
        Ok(match self.store.cms().active(content_type).await? {
            Some(row) => Self::view(content_type, row),
            None => Self::defaults(content_type),
        })
    }

    async fn save(
        &self,
        content_type: CmsContentType,
        sections: Vec<Section>,
        user_id: i32,
    ) -> Result<CmsView, CmsError> {
        validate_sections(&sections)?;

        let row = self
            .store
            .cms()
            .save(content_type, encode_sections(&sections), user_id)
            .await?;

        info!(
            cms_id = row.id,
            content_type = %content_type,
            sections = sections.len(),
            user_id,
            "CMS content saved"
        );
        Ok(Self::view(content_type, row))
    }

    async fn publish(
        &self,
        content_type: CmsContentType,
        user_id: i32,
    ) -> Result<CmsView, CmsError> {
        let row = self
            .store
            .cms()
            .publish(content_type, user_id)
            .await?
            .ok_or(CmsError::NothingToPublish)?;

        info!(cms_id = row.id, content_type = %content_type, user_id, "CMS content published");
        Ok(Self::view(content_type, row))
    }

    async fn reset(&self, content_type: CmsContentType) -> Result<CmsView, CmsError> {
        let deactivated = self.store.cms().reset(content_type).await?;
        info!(content_type = %content_type, deactivated, "CMS content reset to defaults");
        Ok(Self::defaults(content_type))
    }
}
