//! Session state machine: the explicit application-state record for one client.
//!
//! Four steps: Search → Results → ProfileInput → ResumeEditor. All mutation
//! goes through the transitions below; nothing here performs IO. Operations
//! that need the AI gateway are split into `begin_*` (validates, sets the
//! loading flag, returns a ticket) and `complete_*` / `fail_*` (applies the
//! outcome). Each ticket carries a request token; a completion whose token is
//! no longer the pending one is stale and dropped, so a slow response can
//! never overwrite newer state. Leaving a step cancels its pending requests.
//!
//! Back navigation is derived from the current step and whether a job is
//! retained, not from a history stack. Only one level of "back" is exposed.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{JobListing, ResumeData, SearchParams, SearchResult, Source, UserProfile};
use crate::photo::{PhotoImage, PhotoWidget, PointerEvent, ReleaseOutcome};
use crate::render::{html_export, markdown_export, render_document, DocumentTree, ExportFile};
use crate::templates::{find_template, render_markdown, DEFAULT_TEMPLATE_ID};

const ZOOM_MIN_TENTHS: u8 = 5;
const ZOOM_MAX_TENTHS: u8 = 15;
const ZOOM_DEFAULT_TENTHS: u8 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppStep {
    Search,
    Results,
    ProfileInput,
    ResumeEditor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

/// Token of the outstanding request per action; `None` means idle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Pending {
    pub search: Option<u64>,
    pub autofill: Option<u64>,
    pub generation: Option<u64>,
    pub rewrite: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct SearchTicket {
    pub token: u64,
    pub params: SearchParams,
    pub page: u32,
}

#[derive(Debug, Clone)]
pub struct AutofillTicket {
    pub token: u64,
    pub job: Option<JobListing>,
}

#[derive(Debug, Clone)]
pub struct GenerationTicket {
    pub token: u64,
    pub job: Option<JobListing>,
    pub profile: UserProfile,
}

#[derive(Debug, Clone)]
pub struct RewriteTicket {
    pub token: u64,
    pub content: String,
    pub instruction: String,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub(crate) step: AppStep,
    pub(crate) search_params: SearchParams,
    pub(crate) current_page: u32,
    pub(crate) jobs: Vec<JobListing>,
    pub(crate) sources: Vec<Source>,
    pub(crate) show_new_only: bool,
    pub(crate) selected_job: Option<JobListing>,
    pub(crate) profile: UserProfile,
    pub(crate) template_id: String,
    pub(crate) resume_data: Option<ResumeData>,
    pub(crate) resume_content: String,
    pub(crate) photo: Option<PhotoImage>,
    pub(crate) photo_widget: PhotoWidget,
    pub(crate) upload_requested: bool,
    pub(crate) zoom_tenths: u8,
    pub(crate) pending: Pending,
    next_token: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            step: AppStep::Search,
            search_params: SearchParams::default(),
            current_page: 1,
            jobs: Vec::new(),
            sources: Vec::new(),
            show_new_only: false,
            selected_job: None,
            profile: UserProfile::default(),
            template_id: DEFAULT_TEMPLATE_ID.to_string(),
            resume_data: None,
            resume_content: String::new(),
            photo: None,
            photo_widget: PhotoWidget::default(),
            upload_requested: false,
            zoom_tenths: ZOOM_DEFAULT_TENTHS,
            pending: Pending::default(),
            next_token: 0,
        }
    }

    pub fn zoom_level(&self) -> f64 {
        f64::from(self.zoom_tenths) / 10.0
    }

    fn issue_token(&mut self) -> u64 {
        self.next_token += 1;
        self.next_token
    }

    fn require_step(&self, allowed: &[AppStep], action: &str) -> Result<(), AppError> {
        if allowed.contains(&self.step) {
            Ok(())
        } else {
            Err(AppError::InvalidTransition(format!(
                "cannot {action} from {:?}",
                self.step
            )))
        }
    }

    /// Moves to `step`, dropping requests that belong to the step being left.
    fn enter(&mut self, step: AppStep) {
        match self.step {
            AppStep::Search | AppStep::Results => self.pending.search = None,
            AppStep::ProfileInput => {
                self.pending.autofill = None;
                self.pending.generation = None;
            }
            AppStep::ResumeEditor => self.pending.rewrite = None,
        }
        self.step = step;
    }

    // ── Search ──────────────────────────────────────────────────────────────

    /// Submits the search form. The result page always starts at 1.
    pub fn begin_search(&mut self, params: SearchParams) -> Result<SearchTicket, AppError> {
        self.require_step(&[AppStep::Search], "search")?;
        params.validate()?;
        if self.pending.search.is_some() {
            return Err(AppError::Busy("a search is already in progress".to_string()));
        }

        let token = self.issue_token();
        self.pending.search = Some(token);
        self.search_params = params.clone();
        Ok(SearchTicket {
            token,
            params,
            page: 1,
        })
    }

    /// Re-issues the current search for `page`. Pages below 1 are a no-op.
    /// A page change supersedes any search still in flight.
    pub fn begin_page_change(&mut self, page: i64) -> Result<Option<SearchTicket>, AppError> {
        self.require_step(&[AppStep::Results], "change page")?;
        if page < 1 {
            return Ok(None);
        }
        let page = u32::try_from(page)
            .map_err(|_| AppError::Validation(format!("page {page} is out of range")))?;

        let token = self.issue_token();
        self.pending.search = Some(token);
        Ok(Some(SearchTicket {
            token,
            params: self.search_params.clone(),
            page,
        }))
    }

    /// Replaces the job list and sources wholesale. Returns false for a stale ticket.
    pub fn complete_search(&mut self, ticket: &SearchTicket, result: SearchResult) -> bool {
        if self.pending.search != Some(ticket.token) {
            return false;
        }
        self.pending.search = None;
        self.jobs = result.jobs;
        self.sources = result.sources;
        self.current_page = ticket.page;
        self.step = AppStep::Results;
        true
    }

    /// Clears the loading flag; prior jobs, page and step are untouched.
    pub fn fail_search(&mut self, ticket: &SearchTicket) -> bool {
        if self.pending.search != Some(ticket.token) {
            return false;
        }
        self.pending.search = None;
        true
    }

    pub fn set_show_new_only(&mut self, on: bool) -> Result<(), AppError> {
        self.require_step(&[AppStep::Results], "filter results")?;
        self.show_new_only = on;
        Ok(())
    }

    // ── Job selection ───────────────────────────────────────────────────────

    pub fn select_job(&mut self, job_id: &str) -> Result<(), AppError> {
        self.require_step(&[AppStep::Results], "select a job")?;
        let job = self
            .jobs
            .iter()
            .find(|j| j.id == job_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found on this page")))?;
        self.selected_job = Some(job);
        self.enter(AppStep::ProfileInput);
        Ok(())
    }

    /// Résumé creation without a target job.
    pub fn standalone_create(&mut self) -> Result<(), AppError> {
        self.require_step(&[AppStep::Search], "start a standalone résumé")?;
        self.selected_job = None;
        self.enter(AppStep::ProfileInput);
        Ok(())
    }

    // ── Profile ─────────────────────────────────────────────────────────────

    pub fn update_profile(&mut self, profile: UserProfile) -> Result<(), AppError> {
        self.require_step(&[AppStep::ProfileInput], "edit the profile")?;
        self.profile = profile;
        Ok(())
    }

    pub fn begin_autofill(&mut self) -> Result<AutofillTicket, AppError> {
        self.require_step(&[AppStep::ProfileInput], "auto-fill the profile")?;
        if self.pending.autofill.is_some() {
            return Err(AppError::Busy("profile auto-fill already in progress".to_string()));
        }
        let token = self.issue_token();
        self.pending.autofill = Some(token);
        Ok(AutofillTicket {
            token,
            job: self.selected_job.clone(),
        })
    }

    /// Callers pass `UserProfile::fallback()` when the gateway failed.
    pub fn complete_autofill(&mut self, ticket: &AutofillTicket, profile: UserProfile) -> bool {
        if self.pending.autofill != Some(ticket.token) {
            return false;
        }
        self.pending.autofill = None;
        self.profile = profile;
        true
    }

    /// Clears the loading flag without touching the profile.
    pub fn fail_autofill(&mut self, ticket: &AutofillTicket) -> bool {
        if self.pending.autofill != Some(ticket.token) {
            return false;
        }
        self.pending.autofill = None;
        true
    }

    // ── Résumé generation ───────────────────────────────────────────────────

    pub fn begin_generation(&mut self) -> Result<GenerationTicket, AppError> {
        self.require_step(&[AppStep::ProfileInput], "generate a résumé")?;
        self.profile.validate()?;
        if self.pending.generation.is_some() {
            return Err(AppError::Busy("résumé generation already in progress".to_string()));
        }
        let token = self.issue_token();
        self.pending.generation = Some(token);
        Ok(GenerationTicket {
            token,
            job: self.selected_job.clone(),
            profile: self.profile.clone(),
        })
    }

    /// Stores the structure and projects it to text through the selected template.
    pub fn complete_generation(&mut self, ticket: &GenerationTicket, data: ResumeData) -> bool {
        if self.pending.generation != Some(ticket.token) {
            return false;
        }
        self.pending.generation = None;
        self.resume_content = render_markdown(&data, &self.template_id);
        self.resume_data = Some(data);
        self.enter(AppStep::ResumeEditor);
        true
    }

    pub fn fail_generation(&mut self, ticket: &GenerationTicket) -> bool {
        if self.pending.generation != Some(ticket.token) {
            return false;
        }
        self.pending.generation = None;
        true
    }

    // ── Editor ──────────────────────────────────────────────────────────────

    /// The text becomes the sole source of truth; the structure is not updated.
    pub fn edit_content(&mut self, text: String) -> Result<(), AppError> {
        self.require_step(&[AppStep::ResumeEditor], "edit the résumé")?;
        self.resume_content = text;
        Ok(())
    }

    /// Records the selection. Text is regenerated from the structure, discarding
    /// edits, only when `confirmed`. Returns whether the text was regenerated.
    pub fn switch_template(&mut self, template_id: &str, confirmed: bool) -> Result<bool, AppError> {
        self.require_step(
            &[AppStep::ProfileInput, AppStep::ResumeEditor],
            "switch template",
        )?;
        let template = find_template(template_id)
            .ok_or_else(|| AppError::NotFound(format!("Template {template_id} not found")))?;
        self.template_id = template.id.to_string();

        match (&self.resume_data, confirmed) {
            (Some(data), true) => {
                self.resume_content = render_markdown(data, template.id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    pub fn begin_rewrite(&mut self, instruction: &str) -> Result<RewriteTicket, AppError> {
        self.require_step(&[AppStep::ResumeEditor], "rewrite the résumé")?;
        if instruction.trim().is_empty() {
            return Err(AppError::Validation("instruction cannot be empty".to_string()));
        }
        if self.pending.rewrite.is_some() {
            return Err(AppError::Busy("a rewrite is already in progress".to_string()));
        }
        let token = self.issue_token();
        self.pending.rewrite = Some(token);
        Ok(RewriteTicket {
            token,
            content: self.resume_content.clone(),
            instruction: instruction.trim().to_string(),
        })
    }

    /// Replaces the editor text wholesale.
    pub fn complete_rewrite(&mut self, ticket: &RewriteTicket, text: String) -> bool {
        if self.pending.rewrite != Some(ticket.token) {
            return false;
        }
        self.pending.rewrite = None;
        self.resume_content = text;
        true
    }

    pub fn fail_rewrite(&mut self, ticket: &RewriteTicket) -> bool {
        if self.pending.rewrite != Some(ticket.token) {
            return false;
        }
        self.pending.rewrite = None;
        true
    }

    pub fn zoom(&mut self, direction: ZoomDirection) -> Result<f64, AppError> {
        self.require_step(&[AppStep::ResumeEditor], "zoom the preview")?;
        self.zoom_tenths = match direction {
            ZoomDirection::In => (self.zoom_tenths + 1).min(ZOOM_MAX_TENTHS),
            ZoomDirection::Out => self.zoom_tenths.saturating_sub(1).max(ZOOM_MIN_TENTHS),
        };
        Ok(self.zoom_level())
    }

    // ── Photo ───────────────────────────────────────────────────────────────

    pub fn set_photo(&mut self, photo: PhotoImage) -> Result<(), AppError> {
        self.require_step(&[AppStep::ResumeEditor], "upload a photo")?;
        self.photo = Some(photo);
        self.upload_requested = false;
        Ok(())
    }

    /// Feeds one pointer event to the photo widget. A click release asks the
    /// client to open the upload flow.
    pub fn photo_pointer(&mut self, event: PointerEvent) -> Result<Option<ReleaseOutcome>, AppError> {
        self.require_step(&[AppStep::ResumeEditor], "move the photo")?;
        let outcome = self.photo_widget.apply(event);
        if outcome == Some(ReleaseOutcome::Click) {
            self.upload_requested = true;
        }
        Ok(outcome)
    }

    pub fn reset_photo(&mut self) -> Result<(), AppError> {
        self.require_step(&[AppStep::ResumeEditor], "reset the photo")?;
        self.photo_widget.reset();
        Ok(())
    }

    // ── Back ────────────────────────────────────────────────────────────────

    pub fn back(&mut self) -> AppStep {
        let target = match self.step {
            AppStep::ResumeEditor => AppStep::ProfileInput,
            AppStep::ProfileInput if self.selected_job.is_some() => AppStep::Results,
            AppStep::ProfileInput => AppStep::Search,
            AppStep::Results | AppStep::Search => AppStep::Search,
        };
        if target != self.step {
            self.enter(target);
        }
        self.step
    }

    // ── Rendering & export ──────────────────────────────────────────────────

    fn theme_color(&self) -> &'static str {
        find_template(&self.template_id)
            .or_else(|| find_template(DEFAULT_TEMPLATE_ID))
            .map(|t| t.theme_color)
            .unwrap_or_default()
    }

    pub fn render_preview(&self) -> Result<DocumentTree, AppError> {
        self.require_step(&[AppStep::ResumeEditor], "preview the résumé")?;
        Ok(render_document(
            &self.resume_content,
            self.photo.as_ref(),
            self.theme_color(),
            self.photo_widget.placement(),
        ))
    }

    fn export_name(&self) -> &str {
        if !self.profile.full_name.trim().is_empty() {
            &self.profile.full_name
        } else {
            self.resume_data
                .as_ref()
                .map(|d| d.full_name.as_str())
                .unwrap_or_default()
        }
    }

    pub fn export_markdown(&self) -> Result<ExportFile, AppError> {
        if self.step != AppStep::ResumeEditor {
            return Err(AppError::Export("no résumé has been generated yet".to_string()));
        }
        markdown_export(self.export_name(), &self.resume_content)
    }

    pub fn export_html(&self) -> Result<ExportFile, AppError> {
        if self.step != AppStep::ResumeEditor {
            return Err(AppError::Export("no résumé has been generated yet".to_string()));
        }
        html_export(self.export_name(), &self.render_preview()?)
    }
}
