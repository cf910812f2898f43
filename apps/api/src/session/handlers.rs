use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{SearchParams, UserProfile};
use crate::photo::{PhotoImage, PointerEvent, ReleaseOutcome};
use crate::render::{to_html, DocumentTree, ExportFile};
use crate::session::controller;
use crate::session::machine::{AppStep, ZoomDirection};
use crate::session::snapshot::SessionSnapshot;
use crate::state::AppState;
use crate::templates::{templates, ResumeTemplate};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PageRequest {
    pub page: i64,
}

#[derive(Debug, Deserialize)]
pub struct FilterRequest {
    pub new_only: bool,
}

#[derive(Debug, Deserialize)]
pub struct ContentRequest {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct TemplateRequest {
    pub template_id: String,
    /// Regenerate the text from the structure, discarding manual edits.
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Serialize)]
pub struct TemplateSwitchResponse {
    pub regenerated: bool,
    pub session: SessionSnapshot,
}

#[derive(Debug, Deserialize)]
pub struct RewriteRequest {
    pub instruction: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoomRequestDirection {
    In,
    Out,
}

#[derive(Debug, Deserialize)]
pub struct ZoomRequest {
    pub direction: ZoomRequestDirection,
}

#[derive(Debug, Serialize)]
pub struct PointerResponse {
    pub outcome: Option<ReleaseOutcome>,
    pub session: SessionSnapshot,
}

#[derive(Debug, Serialize)]
pub struct BackResponse {
    pub step: AppStep,
    pub session: SessionSnapshot,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub zoom: f64,
    pub document: DocumentTree,
    pub html: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/templates
pub async fn handle_list_templates() -> Json<&'static [ResumeTemplate]> {
    Json(templates())
}

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionSnapshot>) {
    let session = state.sessions.create().await;
    info!("Created session {}", session.id);
    (StatusCode::CREATED, Json(session.snapshot()))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let snapshot = state.sessions.read(id, |s| Ok(s.snapshot())).await?;
    Ok(Json(snapshot))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.remove(id).await?;
    info!("Deleted session {id}");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/sessions/:id/search
pub async fn handle_search(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(params): Json<SearchParams>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let snapshot =
        controller::submit_search(&state.sessions, state.gateway.as_ref(), id, params).await?;
    Ok(Json(snapshot))
}

/// POST /api/v1/sessions/:id/page
pub async fn handle_change_page(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<PageRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let snapshot =
        controller::change_page(&state.sessions, state.gateway.as_ref(), id, req.page).await?;
    Ok(Json(snapshot))
}

/// PUT /api/v1/sessions/:id/filter
pub async fn handle_set_filter(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<FilterRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let snapshot = state
        .sessions
        .update(id, |s| {
            s.set_show_new_only(req.new_only)?;
            Ok(s.snapshot())
        })
        .await?;
    Ok(Json(snapshot))
}

/// POST /api/v1/sessions/:id/jobs/:job_id/select
pub async fn handle_select_job(
    State(state): State<AppState>,
    Path((id, job_id)): Path<(Uuid, String)>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let snapshot = state
        .sessions
        .update(id, |s| {
            s.select_job(&job_id)?;
            Ok(s.snapshot())
        })
        .await?;
    Ok(Json(snapshot))
}

/// POST /api/v1/sessions/:id/standalone
pub async fn handle_standalone(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let snapshot = state
        .sessions
        .update(id, |s| {
            s.standalone_create()?;
            Ok(s.snapshot())
        })
        .await?;
    Ok(Json(snapshot))
}

/// PUT /api/v1/sessions/:id/profile
pub async fn handle_update_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(profile): Json<UserProfile>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let snapshot = state
        .sessions
        .update(id, |s| {
            s.update_profile(profile)?;
            Ok(s.snapshot())
        })
        .await?;
    Ok(Json(snapshot))
}

/// POST /api/v1/sessions/:id/profile/autofill
pub async fn handle_autofill_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let snapshot =
        controller::autofill_profile(&state.sessions, state.gateway.as_ref(), id).await?;
    Ok(Json(snapshot))
}

/// POST /api/v1/sessions/:id/resume
pub async fn handle_generate_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let snapshot =
        controller::generate_resume(&state.sessions, state.gateway.as_ref(), id).await?;
    Ok(Json(snapshot))
}

/// PUT /api/v1/sessions/:id/resume/content
pub async fn handle_edit_content(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ContentRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let snapshot = state
        .sessions
        .update(id, |s| {
            s.edit_content(req.content)?;
            Ok(s.snapshot())
        })
        .await?;
    Ok(Json(snapshot))
}

/// PUT /api/v1/sessions/:id/resume/template
///
/// Without `confirm` only the selection changes; the editor text is kept.
pub async fn handle_switch_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<TemplateRequest>,
) -> Result<Json<TemplateSwitchResponse>, AppError> {
    let response = state
        .sessions
        .update(id, |s| {
            let regenerated = s.switch_template(&req.template_id, req.confirm)?;
            Ok(TemplateSwitchResponse {
                regenerated,
                session: s.snapshot(),
            })
        })
        .await?;
    Ok(Json(response))
}

/// POST /api/v1/sessions/:id/resume/rewrite
pub async fn handle_rewrite(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<RewriteRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let snapshot = controller::rewrite_resume(
        &state.sessions,
        state.gateway.as_ref(),
        id,
        &req.instruction,
    )
    .await?;
    Ok(Json(snapshot))
}

/// POST /api/v1/sessions/:id/back
pub async fn handle_back(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BackResponse>, AppError> {
    let response = state
        .sessions
        .update(id, |s| {
            let step = s.back();
            Ok(BackResponse {
                step,
                session: s.snapshot(),
            })
        })
        .await?;
    Ok(Json(response))
}

/// POST /api/v1/sessions/:id/zoom
pub async fn handle_zoom(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ZoomRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let direction = match req.direction {
        ZoomRequestDirection::In => ZoomDirection::In,
        ZoomRequestDirection::Out => ZoomDirection::Out,
    };
    let snapshot = state
        .sessions
        .update(id, |s| {
            s.zoom(direction)?;
            Ok(s.snapshot())
        })
        .await?;
    Ok(Json(snapshot))
}

/// POST /api/v1/sessions/:id/photo
///
/// Multipart upload; the first file field is used. The image is kept in
/// memory as a data URL and never written anywhere.
pub async fn handle_upload_photo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<SessionSnapshot>, AppError> {
    let mut upload: Option<(Option<String>, Bytes)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
    {
        if field.file_name().is_none() && field.name() != Some("photo") {
            continue;
        }
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("failed to read upload: {e}")))?;
        upload = Some((content_type, data));
        break;
    }

    let (content_type, data) =
        upload.ok_or_else(|| AppError::Validation("no photo file in upload".to_string()))?;
    let photo = PhotoImage::from_bytes(content_type.as_deref(), &data)?;
    info!("Session {id}: photo uploaded ({} bytes)", data.len());

    let snapshot = state
        .sessions
        .update(id, |s| {
            s.set_photo(photo)?;
            Ok(s.snapshot())
        })
        .await?;
    Ok(Json(snapshot))
}

/// POST /api/v1/sessions/:id/photo/pointer
pub async fn handle_photo_pointer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(event): Json<PointerEvent>,
) -> Result<Json<PointerResponse>, AppError> {
    let response = state
        .sessions
        .update(id, |s| {
            let outcome = s.photo_pointer(event)?;
            Ok(PointerResponse {
                outcome,
                session: s.snapshot(),
            })
        })
        .await?;
    Ok(Json(response))
}

/// POST /api/v1/sessions/:id/photo/reset
pub async fn handle_reset_photo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let snapshot = state
        .sessions
        .update(id, |s| {
            s.reset_photo()?;
            Ok(s.snapshot())
        })
        .await?;
    Ok(Json(snapshot))
}

/// GET /api/v1/sessions/:id/preview
pub async fn handle_preview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PreviewResponse>, AppError> {
    let response = state
        .sessions
        .read(id, |s| {
            let document = s.render_preview()?;
            Ok(PreviewResponse {
                zoom: s.zoom_level(),
                html: to_html(&document),
                document,
            })
        })
        .await?;
    Ok(Json(response))
}

fn download(file: ExportFile) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (header::CONTENT_DISPOSITION, file.content_disposition()),
        ],
        file.body,
    )
}

/// GET /api/v1/sessions/:id/export/markdown
pub async fn handle_export_markdown(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let file = state.sessions.read(id, |s| s.export_markdown()).await?;
    info!("Session {id}: exported {}", file.file_name);
    Ok(download(file))
}

/// GET /api/v1/sessions/:id/export/html
pub async fn handle_export_html(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let file = state.sessions.read(id, |s| s.export_html()).await?;
    info!("Session {id}: exported {}", file.file_name);
    Ok(download(file))
}
