use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// One job posting returned by the search gateway. Immutable once received;
/// identity is `id` (unique within a single result page).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobListing {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary_range: String,
    pub tags: Vec<String>,
    pub description: String,
    pub requirements: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apply_url: Option<String>,
    /// Free text, e.g. "3天前", "2 hours ago", "2023-10-25".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posted_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    pub role: String,
    pub location: String,
}

impl SearchParams {
    /// Both fields are required before a search may execute.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.role.trim().is_empty() {
            return Err(AppError::Validation("role cannot be empty".to_string()));
        }
        if self.location.trim().is_empty() {
            return Err(AppError::Validation("location cannot be empty".to_string()));
        }
        Ok(())
    }
}

/// A grounding citation attached to a search response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub uri: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResult {
    pub jobs: Vec<JobListing>,
    pub sources: Vec<Source>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_listing_deserializes_camel_case() {
        let json = r#"{
            "id": "abc",
            "title": "前端工程师",
            "company": "某科技",
            "location": "上海 浦东",
            "salaryRange": "20-35K",
            "tags": ["React", "TypeScript"],
            "description": "负责前端开发",
            "requirements": ["3年经验"],
            "applyUrl": "https://example.com/job/1",
            "postedDate": "3天前"
        }"#;
        let job: JobListing = serde_json::from_str(json).unwrap();
        assert_eq!(job.salary_range, "20-35K");
        assert_eq!(job.apply_url.as_deref(), Some("https://example.com/job/1"));
        assert_eq!(job.posted_date.as_deref(), Some("3天前"));
    }

    #[test]
    fn test_job_listing_tolerates_missing_fields() {
        let job: JobListing = serde_json::from_str(r#"{"title": "Rust Engineer"}"#).unwrap();
        assert_eq!(job.title, "Rust Engineer");
        assert!(job.id.is_empty());
        assert!(job.tags.is_empty());
        assert!(job.posted_date.is_none());
    }

    #[test]
    fn test_search_params_require_both_fields() {
        let ok = SearchParams {
            role: "前端工程师".to_string(),
            location: "上海".to_string(),
        };
        assert!(ok.validate().is_ok());

        let no_location = SearchParams {
            role: "前端工程师".to_string(),
            location: "  ".to_string(),
        };
        assert!(matches!(no_location.validate(), Err(AppError::Validation(_))));

        assert!(SearchParams::default().validate().is_err());
    }
}
