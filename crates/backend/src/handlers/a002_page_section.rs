use axum::{extract::Path, Json};
use contracts::domain::a002_page_section::{
    DisplayPayload, PageSectionConfig, SaveSectionRequest, SaveSectionResponse,
    SectionEditorState, SelectionRules, SetEnabledRequest,
};

use crate::domain::a001_category::catalog::SqliteCategoryCatalog;
use crate::domain::a002_page_section::{service, PageSectionError};
use crate::shared::config;
use crate::shared::data::db::get_connection;

fn catalog() -> SqliteCategoryCatalog {
    SqliteCategoryCatalog::new(get_connection().clone())
}

/// GET /api/page-sections/rules
pub async fn get_rules() -> Json<SelectionRules> {
    Json(config::get().page_sections.rules())
}

/// GET /api/page-sections/:page_id
pub async fn get_config(
    Path(page_id): Path<String>,
) -> Result<Json<PageSectionConfig>, PageSectionError> {
    let config = service::load(get_connection(), &page_id).await?;
    Ok(Json(config))
}

/// PUT /api/page-sections/:page_id
pub async fn save_config(
    Path(page_id): Path<String>,
    Json(request): Json<SaveSectionRequest>,
) -> Result<Json<SaveSectionResponse>, PageSectionError> {
    let limits = config::get().page_sections.rules().limits;
    let saved = service::save(get_connection(), &limits, &page_id, request).await?;
    Ok(Json(SaveSectionResponse {
        success: true,
        message: format!("Секция страницы {} сохранена", page_id),
        last_modified: saved.last_modified,
    }))
}

/// GET /api/page-sections/:page_id/display
pub async fn get_display(
    Path(page_id): Path<String>,
) -> Result<Json<DisplayPayload>, PageSectionError> {
    let payload = service::render(get_connection(), &catalog(), &page_id).await?;
    Ok(Json(payload))
}

/// PATCH /api/page-sections/:page_id/enabled
pub async fn set_enabled(
    Path(page_id): Path<String>,
    Json(request): Json<SetEnabledRequest>,
) -> Result<Json<PageSectionConfig>, PageSectionError> {
    let config = service::set_enabled(get_connection(), &page_id, request.enabled).await?;
    Ok(Json(config))
}

/// GET /api/page-sections/:page_id/editor
pub async fn get_editor_state(
    Path(page_id): Path<String>,
) -> Result<Json<SectionEditorState>, PageSectionError> {
    let rules = config::get().page_sections.rules();
    let state = service::editor_state(get_connection(), &catalog(), rules, &page_id).await?;
    Ok(Json(state))
}
