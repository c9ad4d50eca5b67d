//! Landing-page content endpoints. Visitors read the published page; admins
//! edit, publish and reset it.

use axum::{Json, extract::State};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, CurrentUser};
use crate::domain::{CmsContentType, Section};
use crate::services::{CmsError, CmsView, Requirement, authorize};

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct SaveContentRequest {
    pub sections: serde_json::Value,
}

impl From<CmsError> for ApiError {
    fn from(err: CmsError) -> Self {
        match err {
            CmsError::NothingToPublish => Self::NotFound(err.to_string()),
            CmsError::InvalidSections(_) => Self::validation(err.to_string()),
            CmsError::Database(msg) => Self::Database(msg),
            CmsError::Internal(msg) => Self::internal(msg),
        }
    }
}

fn parse_sections(raw: serde_json::Value) -> Result<Vec<Section>, ApiError> {
    if raw.is_null() {
        return Err(ApiError::validation("Sections are required"));
    }
    serde_json::from_value(raw).map_err(|e| ApiError::validation(format!("Invalid sections: {e}")))
}

/// GET /cms/home
pub async fn get_published_home(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<CmsView>>, ApiError> {
    let view = state
        .cms_service()
        .published(CmsContentType::HomePage)
        .await?;
    Ok(Json(ApiResponse::success(view)))
}

/// GET /admin/cms/home
pub async fn get_editable_home(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
) -> Result<Json<ApiResponse<CmsView>>, ApiError> {
    authorize(&caller, Requirement::Admin)?;

    let view = state
        .cms_service()
        .editable(CmsContentType::HomePage)
        .await?;
    Ok(Json(ApiResponse::success(view)))
}

/// PUT /admin/cms/home
///
/// Saving publishes the new sections right away.
pub async fn save_home(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Json(payload): Json<SaveContentRequest>,
) -> Result<Json<ApiResponse<CmsView>>, ApiError> {
    authorize(&caller, Requirement::Admin)?;
    let sections = parse_sections(payload.sections)?;

    let view = state
        .cms_service()
        .save(CmsContentType::HomePage, sections, caller.id)
        .await?;
    Ok(Json(ApiResponse::success(view)))
}

/// POST /admin/cms/home/publish
pub async fn publish_home(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
) -> Result<Json<ApiResponse<CmsView>>, ApiError> {
    authorize(&caller, Requirement::Admin)?;

    let view = state
        .cms_service()
        .publish(CmsContentType::HomePage, caller.id)
        .await?;
    Ok(Json(ApiResponse::success(view)))
}

/// POST /admin/cms/home/reset
pub async fn reset_home(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
) -> Result<Json<ApiResponse<CmsView>>, ApiError> {
    authorize(&caller, Requirement::Admin)?;

    let view = state.cms_service().reset(CmsContentType::HomePage).await?;
    Ok(Json(ApiResponse::success(view)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_sections() {
        let sections = parse_sections(json!([
            {"id": "hero", "type": "hero", "order": 0, "content": {"title": "Welcome"}}
        ]))
        .unwrap();
        assert_eq!(sections.len(), 1);
        assert!(sections[0].enabled);

        assert!(parse_sections(serde_json::Value::Null).is_err());
        assert!(parse_sections(json!([{"id": "x", "type": "carousel", "order": 0}])).is_err());
    }
}
