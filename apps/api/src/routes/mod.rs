pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::session::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/templates", get(handlers::handle_list_templates))
        // Session lifecycle
        .route("/api/v1/sessions", post(handlers::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(handlers::handle_get_session).delete(handlers::handle_delete_session),
        )
        .route("/api/v1/sessions/:id/back", post(handlers::handle_back))
        // Search & results
        .route("/api/v1/sessions/:id/search", post(handlers::handle_search))
        .route("/api/v1/sessions/:id/page", post(handlers::handle_change_page))
        .route("/api/v1/sessions/:id/filter", put(handlers::handle_set_filter))
        .route(
            "/api/v1/sessions/:id/jobs/:job_id/select",
            post(handlers::handle_select_job),
        )
        .route(
            "/api/v1/sessions/:id/standalone",
            post(handlers::handle_standalone),
        )
        // Profile
        .route(
            "/api/v1/sessions/:id/profile",
            put(handlers::handle_update_profile),
        )
        .route(
            "/api/v1/sessions/:id/profile/autofill",
            post(handlers::handle_autofill_profile),
        )
        // Résumé editor
        .route(
            "/api/v1/sessions/:id/resume",
            post(handlers::handle_generate_resume),
        )
        .route(
            "/api/v1/sessions/:id/resume/content",
            put(handlers::handle_edit_content),
        )
        .route(
            "/api/v1/sessions/:id/resume/template",
            put(handlers::handle_switch_template),
        )
        .route(
            "/api/v1/sessions/:id/resume/rewrite",
            post(handlers::handle_rewrite),
        )
        .route("/api/v1/sessions/:id/zoom", post(handlers::handle_zoom))
        // Photo
        .route(
            "/api/v1/sessions/:id/photo",
            post(handlers::handle_upload_photo).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/api/v1/sessions/:id/photo/pointer",
            post(handlers::handle_photo_pointer),
        )
        .route(
            "/api/v1/sessions/:id/photo/reset",
            post(handlers::handle_reset_photo),
        )
        // Preview & export
        .route("/api/v1/sessions/:id/preview", get(handlers::handle_preview))
        .route(
            "/api/v1/sessions/:id/export/markdown",
            get(handlers::handle_export_markdown),
        )
        .route(
            "/api/v1/sessions/:id/export/html",
            get(handlers::handle_export_html),
        )
        .with_state(state)
}
