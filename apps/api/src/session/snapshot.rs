//! Serializable view of a session, returned by every session endpoint.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::jobs::{badge, filter_new_only, RecencyBadge};
use crate::models::{JobListing, ResumeData, SearchParams, Source, UserProfile};
use crate::photo::{InteractionMode, PhotoPlacement};
use crate::session::machine::{AppStep, Session};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobView {
    #[serde(flatten)]
    pub job: JobListing,
    pub recency: RecencyBadge,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadingView {
    pub search: bool,
    pub autofill: bool,
    pub generation: bool,
    pub rewrite: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoView {
    pub data_url: Option<String>,
    pub placement: PhotoPlacement,
    pub interaction: InteractionMode,
    /// Set by a click on the photo frame; cleared by the next upload.
    pub upload_requested: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub step: AppStep,
    pub search_params: SearchParams,
    pub current_page: u32,
    pub show_new_only: bool,
    /// Jobs after the "new only" filter, in server order.
    pub jobs: Vec<JobView>,
    pub total_jobs: usize,
    pub sources: Vec<Source>,
    pub selected_job: Option<JobListing>,
    pub profile: UserProfile,
    pub template_id: String,
    pub resume_data: Option<ResumeData>,
    pub resume_content: String,
    pub zoom: f64,
    pub photo: PhotoView,
    pub loading: LoadingView,
    pub can_go_back: bool,
}

impl Session {
    pub fn snapshot(&self) -> SessionSnapshot {
        let jobs = filter_new_only(&self.jobs, self.show_new_only)
            .into_iter()
            .map(|job| JobView {
                recency: badge(job.posted_date.as_deref()),
                job: job.clone(),
            })
            .collect();

        SessionSnapshot {
            id: self.id,
            created_at: self.created_at,
            step: self.step,
            search_params: self.search_params.clone(),
            current_page: self.current_page,
            show_new_only: self.show_new_only,
            jobs,
            total_jobs: self.jobs.len(),
            sources: self.sources.clone(),
            selected_job: self.selected_job.clone(),
            profile: self.profile.clone(),
            template_id: self.template_id.clone(),
            resume_data: self.resume_data.clone(),
            resume_content: self.resume_content.clone(),
            zoom: self.zoom_level(),
            photo: PhotoView {
                data_url: self.photo.as_ref().map(|p| p.data_url.clone()),
                placement: self.photo_widget.placement(),
                interaction: self.photo_widget.mode(),
                upload_requested: self.upload_requested,
            },
            loading: LoadingView {
                search: self.pending.search.is_some(),
                autofill: self.pending.autofill.is_some(),
                generation: self.pending.generation.is_some(),
                rewrite: self.pending.rewrite.is_some(),
            },
            can_go_back: self.step != AppStep::Search,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::recency::Recency;
    use crate::models::SearchResult;

    fn job(id: &str, posted: Option<&str>) -> JobListing {
        JobListing {
            id: id.to_string(),
            posted_date: posted.map(str::to_string),
            ..Default::default()
        }
    }

    fn with_jobs() -> Session {
        let mut s = Session::new();
        let t = s
            .begin_search(SearchParams {
                role: "Rust".to_string(),
                location: "上海".to_string(),
            })
            .unwrap();
        s.complete_search(
            &t,
            SearchResult {
                jobs: vec![
                    job("a", Some("2天前")),
                    job("b", Some("2个月前")),
                    job("c", None),
                ],
                sources: vec![],
            },
        );
        s
    }

    #[test]
    fn test_snapshot_badges_every_job() {
        let snap = with_jobs().snapshot();
        assert_eq!(snap.jobs.len(), 3);
        assert_eq!(snap.jobs[0].recency.recency, Recency::New);
        assert_eq!(snap.jobs[1].recency.recency, Recency::Old);
        assert_eq!(snap.jobs[2].recency.recency, Recency::Neutral);
        assert!(snap.can_go_back);
    }

    #[test]
    fn test_new_only_filter_keeps_total() {
        let mut s = with_jobs();
        s.set_show_new_only(true).unwrap();
        let snap = s.snapshot();
        assert_eq!(snap.jobs.len(), 1);
        assert_eq!(snap.jobs[0].job.id, "a");
        assert_eq!(snap.total_jobs, 3);
    }

    #[test]
    fn test_snapshot_serializes_camel_case() {
        let value = serde_json::to_value(Session::new().snapshot()).unwrap();
        assert_eq!(value["step"], "SEARCH");
        assert_eq!(value["currentPage"], 1);
        assert_eq!(value["loading"]["search"], false);
        assert_eq!(value["photo"]["uploadRequested"], false);
        assert_eq!(value["canGoBack"], false);
    }
}
