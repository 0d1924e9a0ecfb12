use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::handlers;

/// Конфигурация всех роутов приложения
pub fn configure_routes() -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // PAGE SECTIONS
        // ========================================
        .route(
            "/api/page-sections/rules",
            get(handlers::a002_page_section::get_rules),
        )
        .route(
            "/api/page-sections/:page_id",
            get(handlers::a002_page_section::get_config)
                .put(handlers::a002_page_section::save_config),
        )
        .route(
            "/api/page-sections/:page_id/display",
            get(handlers::a002_page_section::get_display),
        )
        .route(
            "/api/page-sections/:page_id/enabled",
            patch(handlers::a002_page_section::set_enabled),
        )
        .route(
            "/api/page-sections/:page_id/editor",
            get(handlers::a002_page_section::get_editor_state),
        )
        // ========================================
        // CATEGORY CATALOG
        // ========================================
        .route(
            "/api/categories",
            get(handlers::a001_category::list_all).post(handlers::a001_category::upsert),
        )
        .route(
            "/api/categories/main",
            get(handlers::a001_category::list_main),
        )
        .route("/api/categories/sub", get(handlers::a001_category::list_sub))
        .route(
            "/api/categories/testdata",
            post(handlers::a001_category::insert_test_data),
        )
        .route(
            "/api/categories/:id",
            get(handlers::a001_category::get_by_id).delete(handlers::a001_category::deactivate),
        )
        // Logs handlers
        .route(
            "/api/logs",
            get(handlers::logs::list_recent).delete(handlers::logs::clear_all),
        )
}
